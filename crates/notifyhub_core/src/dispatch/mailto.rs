//! Local mail-client handoff through a `mailto:` URI.
//!
//! # Invariants
//! - Addresses, the subject and the plain-text body are percent-encoded;
//!   `@` stays literal in addresses.
//! - Body line breaks are encoded as CRLF.
//! - A successful send only means the handler was invoked.

use super::plain_text::html_to_plain_text;
use super::{DispatchError, DispatchOutcome, NotificationDispatcher, SendNotificationRequest};
use log::{error, info};

/// Capability that opens a URI with the platform's registered handler.
pub trait MailLauncher {
    fn launch(&self, uri: &str) -> Result<(), String>;
}

impl<T: MailLauncher + ?Sized> MailLauncher for &T {
    fn launch(&self, uri: &str) -> Result<(), String> {
        (**self).launch(uri)
    }
}

/// Opens URIs through the operating system default handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMailLauncher;

impl MailLauncher for SystemMailLauncher {
    fn launch(&self, uri: &str) -> Result<(), String> {
        webbrowser::open(uri).map_err(|err| err.to_string())
    }
}

/// Dispatcher that composes a `mailto:` URI and hands it to a launcher.
pub struct MailtoDispatcher<L: MailLauncher> {
    launcher: L,
}

impl<L: MailLauncher> MailtoDispatcher<L> {
    pub fn new(launcher: L) -> Self {
        Self { launcher }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }
}

impl<L: MailLauncher> NotificationDispatcher for MailtoDispatcher<L> {
    fn send(&self, request: &SendNotificationRequest) -> Result<DispatchOutcome, DispatchError> {
        let uri = build_mailto_uri(request);
        match self.launcher.launch(&uri) {
            Ok(()) => {
                info!(
                    "event=notification_send module=dispatch status=ok strategy=mailto to_count={} cc_count={} group_count={}",
                    request.to.len(),
                    request.cc.len(),
                    request.selected_group_ids.len()
                );
                Ok(DispatchOutcome::HandedToMailClient)
            }
            Err(message) => {
                error!(
                    "event=notification_send module=dispatch status=error strategy=mailto error_code=launch_failed"
                );
                Err(DispatchError::Launch(message))
            }
        }
    }
}

/// Builds `mailto:<to>?cc=<cc>&subject=<subject>&body=<body>`.
///
/// `cc` is omitted when empty. The HTML body is flattened to plain text.
pub fn build_mailto_uri(request: &SendNotificationRequest) -> String {
    let mut uri = format!("mailto:{}", encode_addresses(&request.to));

    let mut query = Vec::new();
    if !request.cc.is_empty() {
        query.push(format!("cc={}", encode_addresses(&request.cc)));
    }
    query.push(format!("subject={}", urlencoding::encode(&request.subject)));

    let body = html_to_plain_text(&request.body).replace('\n', "\r\n");
    if !body.is_empty() {
        query.push(format!("body={}", urlencoding::encode(&body)));
    }

    uri.push('?');
    uri.push_str(&query.join("&"));
    uri
}

/// Percent-encodes each address but keeps `@` literal, which some mail
/// handlers do not decode in the address part.
fn encode_addresses(addresses: &[String]) -> String {
    addresses
        .iter()
        .map(|address| urlencoding::encode(address).replace("%40", "@"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::build_mailto_uri;
    use crate::dispatch::SendNotificationRequest;

    fn request(to: &[&str], cc: &[&str], subject: &str, body: &str) -> SendNotificationRequest {
        SendNotificationRequest {
            to: to.iter().map(|value| value.to_string()).collect(),
            cc: cc.iter().map(|value| value.to_string()).collect(),
            subject: subject.to_string(),
            body: body.to_string(),
            selected_group_ids: Vec::new(),
        }
    }

    #[test]
    fn encodes_every_component() {
        let uri = build_mailto_uri(&request(
            &["a@x.com", "b+ops@x.com"],
            &["c@x.com"],
            "Outage & recovery",
            "<p>line one</p><p>line two</p>",
        ));
        assert_eq!(
            uri,
            "mailto:a@x.com,b%2Bops@x.com?cc=c@x.com&subject=Outage%20%26%20recovery&body=line%20one%0D%0Aline%20two"
        );
    }

    #[test]
    fn address_reserved_characters_are_encoded_but_at_sign_is_not() {
        let uri = build_mailto_uri(&request(&["ops&dev@x.com", "100%@x.com"], &[], "Hi", ""));
        assert_eq!(uri, "mailto:ops%26dev@x.com,100%25@x.com?subject=Hi");
    }

    #[test]
    fn omits_empty_cc_and_body() {
        let uri = build_mailto_uri(&request(&["a@x.com"], &[], "Hi", ""));
        assert_eq!(uri, "mailto:a@x.com?subject=Hi");
    }

    #[test]
    fn cc_only_request_has_empty_recipient_path() {
        let uri = build_mailto_uri(&request(&[], &["c@x.com"], "Hi", ""));
        assert!(uri.starts_with("mailto:?cc=c@x.com"));
    }
}
