//! HTML for the connect form page.

use crate::{error::ConnectError, models::connect_result::ConnectOutcome};

/// Shown when the instance needs no pairing.
pub const ALREADY_CONNECTED: &str =
    "This WhatsApp is already connected. No action is needed.";

/// View model of the connect form page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexPage {
    /// Status or error message
    pub message: Option<String>,
    /// Pairing code to display
    pub pair_code: Option<String>,
    /// Email to pre-fill the input with
    pub email: String,
}

impl IndexPage {
    /// The page for the result of a form submission.
    pub fn from_result(email: &str, result: Result<ConnectOutcome, ConnectError>) -> Self {
        let email = email.trim().to_string();

        match result {
            Ok(ConnectOutcome::AlreadyConnected) => Self {
                message: Some(ALREADY_CONNECTED.to_string()),
                pair_code: None,
                email,
            },
            Ok(ConnectOutcome::PairCode(code)) => Self {
                message: None,
                pair_code: Some(code),
                email,
            },
            Err(err) => Self {
                message: Some(err.to_string()),
                pair_code: None,
                email,
            },
        }
    }

    /// Render the full HTML document.
    pub fn render(&self) -> String {
        let message = self
            .message
            .as_deref()
            .map(|message| format!(r#"<p class="message">{}</p>"#, escape(message)))
            .unwrap_or_default();

        let pair_code = self
            .pair_code
            .as_deref()
            .map(|code| {
                format!(
                    r#"<section class="pair-code">
      <p>Enter this code on your phone under <em>Linked devices &rarr; Link with phone number</em>:</p>
      <code>{}</code>
    </section>"#,
                    escape(code)
                )
            })
            .unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Connect WhatsApp</title>
    <style>
      body {{ font-family: system-ui, sans-serif; max-width: 28rem; margin: 4rem auto; padding: 0 1rem; }}
      input, button {{ font-size: 1rem; padding: .5rem; }}
      input {{ width: 100%; box-sizing: border-box; margin-bottom: .5rem; }}
      .message {{ padding: .75rem; background: #f4f4f5; border-radius: .25rem; }}
      .pair-code code {{ display: block; font-size: 2rem; letter-spacing: .25rem; text-align: center; }}
    </style>
  </head>
  <body>
    <h1>Connect WhatsApp</h1>
    <form method="post" action="/">
      <label for="email">Email</label>
      <input id="email" name="email" type="email" value="{email}" required>
      <button type="submit">Get pairing code</button>
    </form>
    {message}
    {pair_code}
  </body>
</html>
"#,
            email = escape(&self.email),
        )
    }
}

/// Escape text for use in HTML element content and quoted attributes.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
