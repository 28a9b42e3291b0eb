use decay_core::Tier;

use crate::{AlertMessage, MessageKind};

pub struct EmailTemplate;

impl EmailTemplate {
    /// HTML rendition of a message. The plain-text body is kept verbatim
    /// inside a `<pre>` block under a tier-coloured banner.
    pub fn render(message: &AlertMessage) -> String {
        let severity = message.severity();
        let color = tier_color(severity);
        let banner = match &message.kind {
            MessageKind::TickerAlert { ticker, tier, score } => {
                let ticker = escape_html(ticker);
                format!("{} {ticker} &mdash; {tier} ({score}/100)", tier.glyph())
            }
            MessageKind::DailyDigest {
                critical, warning, ..
            } => format!("Daily Summary &mdash; {critical} critical, {warning} warning"),
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1"></head>
<body style="margin:0;padding:0;background:#f1f5f9;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;">
<table width="100%" cellpadding="0" cellspacing="0" style="background:#f1f5f9;padding:32px 0;">
  <tr><td align="center">
    <table width="600" cellpadding="0" cellspacing="0" style="background:#ffffff;border-radius:8px;overflow:hidden;box-shadow:0 1px 3px rgba(0,0,0,0.1);">
      <tr><td>
        <div style="background:{color};color:#fff;padding:12px 20px;border-radius:8px 8px 0 0;font-size:18px;font-weight:700;">{banner}</div>
        <pre style="padding:16px 20px;margin:0;color:#334155;font-size:14px;white-space:pre-wrap;">{body}</pre>
      </td></tr>
      <tr><td style="padding:16px 20px;border-top:1px solid #e2e8f0;">
        <p style="margin:0;color:#94a3b8;font-size:12px;">Sent at {ts} UTC</p>
      </td></tr>
    </table>
    <p style="color:#94a3b8;font-size:11px;margin-top:16px;">Corporate Decay Monitor</p>
  </td></tr>
</table>
</body>
</html>"#,
            body = escape_html(&message.body),
            ts = message.timestamp.format("%Y-%m-%d %H:%M:%S"),
        )
    }
}

fn tier_color(tier: Tier) -> &'static str {
    match tier {
        Tier::Critical => "#ef4444",
        Tier::Warning => "#f97316",
        Tier::Attention => "#eab308",
        Tier::Normal => "#22c55e",
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_escapes_body() {
        let message = AlertMessage {
            kind: MessageKind::TickerAlert {
                ticker: "GME".to_string(),
                tier: Tier::Warning,
                score: 60,
            },
            subject: "s".to_string(),
            body: "<script>alert(1)</script> & more".to_string(),
            timestamp: chrono::Utc::now(),
        };
        let html = EmailTemplate::render(&message);
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&amp; more"));
        assert!(html.contains("#f97316"));
        assert!(html.contains("GME &mdash; WARNING (60/100)"));
    }

    #[test]
    fn test_render_escapes_ticker_in_banner() {
        let message = AlertMessage {
            kind: MessageKind::TickerAlert {
                ticker: "<img src=x>".to_string(),
                tier: Tier::Critical,
                score: 90,
            },
            subject: "s".to_string(),
            body: "body".to_string(),
            timestamp: chrono::Utc::now(),
        };
        let html = EmailTemplate::render(&message);
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;img src=x&gt; &mdash; CRITICAL (90/100)"));
    }
}
