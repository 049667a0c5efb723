// src/render.rs
use crate::analyzer::Analysis;
use crate::presentation::{AdvisoryTone, LabelPolicy};

pub const PAGE_TITLE: &str = "🧠 Mental Health Sentiment Analyzer";

/// What to show under the form.
pub enum Outcome<'a> {
    Result(&'a Analysis),
    Warning(&'a str),
    /// Inference broke; the page still renders with the message
    Failure(&'a str),
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn tone_class(tone: AdvisoryTone) -> &'static str {
    match tone {
        AdvisoryTone::Success => "advisory success",
        AdvisoryTone::Info => "advisory info",
        AdvisoryTone::Warning => "advisory warning",
        AdvisoryTone::Error => "advisory error",
    }
}

fn heading(policy: LabelPolicy) -> &'static str {
    match policy {
        LabelPolicy::Sentiment => "Predicted Sentiment",
        LabelPolicy::CategoryText | LabelPolicy::CategoryIndex => "Predicted Category",
    }
}

pub fn render_page(policy: LabelPolicy, input: &str, outcome: Option<Outcome<'_>>) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", PAGE_TITLE));
    html.push_str("<link rel=\"stylesheet\" href=\"/static/style.css\">\n");
    html.push_str("</head>\n<body>\n<main>\n");

    html.push_str(&format!("<h1>{}</h1>\n", PAGE_TITLE));
    html.push_str("<p>Type your thoughts or feelings below, and the app will predict your sentiment!</p>\n");

    html.push_str("<form method=\"post\" action=\"/\">\n");
    html.push_str("<label for=\"text\">Enter your sentence here:</label>\n");
    html.push_str(&format!(
        "<textarea id=\"text\" name=\"text\" rows=\"6\">{}</textarea>\n",
        escape_html(input)
    ));
    html.push_str("<button type=\"submit\">Analyze Sentiment</button>\n");
    html.push_str("</form>\n");

    match outcome {
        Some(Outcome::Result(analysis)) => {
            let r = &analysis.result;
            html.push_str(&format!(
                "<h2 style='color:{};'>{}: {}</h2>\n",
                r.color,
                heading(policy),
                escape_html(&r.label)
            ));
            html.push_str(&format!(
                "<div class=\"{}\">{}</div>\n",
                tone_class(r.advisory.tone),
                escape_html(&r.advisory.message)
            ));
        }
        Some(Outcome::Warning(message)) | Some(Outcome::Failure(message)) => {
            html.push_str(&format!(
                "<div class=\"{}\">{}</div>\n",
                tone_class(AdvisoryTone::Error),
                escape_html(message)
            ));
        }
        None => {}
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::PredictedLabel;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_blank_page_has_form() {
        let html = render_page(LabelPolicy::Sentiment, "", None);
        assert!(html.contains(PAGE_TITLE));
        assert!(html.contains("name=\"text\""));
        assert!(html.contains("Analyze Sentiment</button>"));
        assert!(!html.contains("<h2"));
    }

    #[test]
    fn test_result_is_colored() {
        let label = PredictedLabel::Text("positive".into());
        let analysis = Analysis {
            id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            policy: LabelPolicy::Sentiment,
            cleaned_text: "great day".into(),
            result: LabelPolicy::Sentiment.display(&label),
            predicted_label: label,
        };
        let html = render_page(LabelPolicy::Sentiment, "Great day!", Some(Outcome::Result(&analysis)));
        assert!(html.contains("<h2 style='color:#2ECC71;'>Predicted Sentiment: Positive 😊</h2>"));
        assert!(html.contains("advisory success"));
        assert!(html.contains(">Great day!</textarea>"));
    }

    #[test]
    fn test_input_is_escaped() {
        let html = render_page(
            LabelPolicy::CategoryText,
            "</textarea><script>alert('x')</script>",
            Some(Outcome::Warning("Please enter some text to analyze.")),
        );
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;/textarea&gt;"));
        assert!(html.contains("advisory error"));
    }

    #[test]
    fn test_failure_shows_message_without_result() {
        let html = render_page(
            LabelPolicy::Sentiment,
            "hi",
            Some(Outcome::Failure("Analysis failed: classifier returned no prediction")),
        );
        assert!(html.contains("<div class=\"advisory error\">Analysis failed: classifier returned no prediction</div>"));
        assert!(!html.contains("<h2"));
    }
}
