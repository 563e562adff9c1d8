//! Verification mail content.

use victory_identity::{CodeNotification, NotifyError, RequestKind};

pub const SUBJECT: &str = "Verify Email Address for Victory";

const REGISTRATION_INTRO: &str = "Thanks for registering for an account on Victory! \
Before we get started, we just need to confirm that this is you. \
Enter the code below to verify your email address:";

const UPDATE_INTRO: &str = "We received a request to change your info on Victory! \
Before we get started, we just need to confirm that this is you. \
If you didn't request an info change, you can ignore this message and continue \
to use your account like normal.";

/// Subject and bodies for one verification mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: String,
    pub html: String,
    pub text: String,
}

fn intro(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::Registration => REGISTRATION_INTRO,
        RequestKind::Update => UPDATE_INTRO,
    }
}

/// Escape text for inclusion in HTML element content or attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render a notification. `ttl_minutes` feeds the expiry notice.
///
/// Line breaks in the recipient or display name are refused; both end up
/// in header-like positions.
pub fn render(
    notification: &CodeNotification,
    ttl_minutes: u64,
) -> Result<RenderedMessage, NotifyError> {
    if notification.to.trim().is_empty() {
        return Err(NotifyError::Template("empty recipient".to_string()));
    }
    if [&notification.to, &notification.display_name]
        .iter()
        .any(|v| v.contains(|c: char| c == '\r' || c == '\n'))
    {
        return Err(NotifyError::Template(
            "line break in recipient or display name".to_string(),
        ));
    }

    let name = escape_html(&notification.display_name);
    let intro_text = intro(notification.kind);

    let digit_cells: String = notification
        .code
        .digits()
        .iter()
        .map(|d| {
            format!(
                r#"<td align="center"><h1 style="background:#101014;border-radius:0.375rem;margin:1rem;padding:0.8rem 0.7rem 0.7rem;">{}</h1></td>"#,
                d
            )
        })
        .collect();

    let html = format!(
        r#"<html lang="en">
<body style="min-width:320px;max-width:620px;background:#101014;font-family:'Lato',sans-serif;color:white;">
  <table role="presentation" width="100%" border="0" cellspacing="0" cellpadding="0">
    <tr><td align="center" style="padding-top:2rem;font-size:3rem;font-weight:bold;">V</td></tr>
    <tr><td>
      <h1 style="text-align:center;font-size:1.8rem;">Hey, {name}</h1>
      <p style="text-align:center;padding-bottom:2rem;font-size:0.9rem;">{intro}</p>
    </td></tr>
    <tr><td align="center" style="padding:1rem;background:#252528;border-radius:0.375rem;">
      <h1 style="font-size:1.5rem;">Verification Code</h1>
      <table role="presentation" border="0" cellspacing="0" cellpadding="0"><tr>{cells}</tr></table>
      <p style="font-size:0.75rem;">Verification codes expire after {ttl} mins.</p>
    </td></tr>
  </table>
</body>
</html>"#,
        name = name,
        intro = escape_html(intro_text),
        cells = digit_cells,
        ttl = ttl_minutes,
    );

    let text = format!(
        "Hey, {name}\n\n{intro}\n\nVerification code: {code}\n\nVerification codes expire after {ttl} mins.\n",
        name = notification.display_name,
        intro = intro_text,
        code = notification.code,
        ttl = ttl_minutes,
    );

    Ok(RenderedMessage {
        subject: SUBJECT.to_string(),
        html,
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use victory_identity::VerificationCode;

    fn notification(name: &str, kind: RequestKind) -> CodeNotification {
        CodeNotification {
            to: "nova@gmail.com".to_string(),
            display_name: name.to_string(),
            code: VerificationCode::new(482).unwrap(),
            kind,
        }
    }

    #[test]
    fn test_render_splits_digits_and_pads() {
        let message = render(&notification("nova", RequestKind::Registration), 15).unwrap();
        assert_eq!(message.subject, SUBJECT);
        assert!(message.html.contains("Hey, nova"));
        assert_eq!(message.html.matches("<td align=\"center\"><h1").count(), 4);
        assert!(message.text.contains("Verification code: 0482"));
        assert!(message.text.contains("expire after 15 mins"));
        assert!(message.text.contains("Thanks for registering"));
    }

    #[test]
    fn test_update_intro() {
        let message = render(&notification("nova", RequestKind::Update), 15).unwrap();
        assert!(message.text.contains("change your info"));
        assert!(!message.text.contains("Thanks for registering"));
    }

    #[test]
    fn test_alias_is_escaped() {
        let message = render(&notification("<script>x</script>", RequestKind::Update), 15).unwrap();
        assert!(!message.html.contains("<script>"));
        assert!(message.html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_line_breaks_rejected() {
        let err = render(&notification("nova\r\nBcc: x@y", RequestKind::Update), 15).unwrap_err();
        assert!(matches!(err, NotifyError::Template(_)));

        let mut n = notification("nova", RequestKind::Registration);
        n.to = " ".to_string();
        assert!(render(&n, 15).is_err());
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"a&b"c'"#), "a&amp;b&quot;c&#39;");
    }
}
