use std::fmt::Write;

use crate::batch::EmailBatch;
use crate::metrics::ScoredEmail;
use crate::models::{ChatMessage, ChatRole};

/// Number of most-recent conversation messages embedded in a chat prompt.
pub const HISTORY_WINDOW: usize = 10;

fn format_email_block(scored: &ScoredEmail) -> String {
    let mut block = String::new();
    let _ = writeln!(block, "Subject: {}", scored.record.subject);
    let _ = writeln!(
        block,
        "Metrics: sent {}, open rate {:.2}%, click rate {:.2}%, unsubscribe rate {:.2}%, effectiveness score {:.2}",
        scored.record.sent,
        scored.metrics.open_rate,
        scored.metrics.click_rate,
        scored.metrics.unsub_rate,
        scored.metrics.effectiveness_score
    );
    let _ = writeln!(block, "Plaintext:\n{}", scored.record.plaintext);
    let _ = writeln!(block, "Message body:\n{}", scored.record.message_body);
    block
}

pub fn batch_analysis_prompt(batch: &EmailBatch<'_>) -> String {
    let emails = batch
        .emails
        .iter()
        .map(format_email_block)
        .collect::<Vec<_>>()
        .join("\n---\n");

    format!(
        "You are an expert email marketing analyst. Analyze the following email batch \
to identify what makes emails effective.\n\n\
EMAIL BATCH {} of {}:\n{}\n\n\
For this batch, analyze:\n\
1. Subject line patterns and their impact on open rates\n\
2. Content elements that drive clicks\n\
3. Factors that affect unsubscribe rates\n\
4. Specific strengths and weaknesses of these emails\n\n\
Provide a concise analysis focusing on actionable insights.",
        batch.index, batch.total, emails
    )
}

pub fn synthesis_prompt(batch_analyses: &[String]) -> String {
    format!(
        "You are an expert email marketing analyst. Based on the following batch \
analyses, provide a comprehensive summary identifying:\n\n\
BATCH ANALYSES:\n{}\n\n\
Provide a final comprehensive analysis with:\n\
1. Overall patterns across all emails\n\
2. Subject line best practices identified\n\
3. Content elements that drive engagement\n\
4. Common mistakes to avoid\n\
5. Actionable recommendations for improving email effectiveness\n\n\
Provide a clear, actionable summary.",
        batch_analyses.concat()
    )
}

pub fn expert_system_prompt(context: Option<&str>) -> String {
    let mut prompt = "You are an expert email marketing consultant with deep expertise in:\n\n\
1. **Email Marketing Strategy:** subject line optimization, open and click-through \
rate optimization, list segmentation, deliverability, and compliance (CAN-SPAM, GDPR).\n\
2. **Content Strategy:** email copywriting, content structure and scannability, \
personalization, automation and lifecycle campaigns.\n\
3. **Performance Analysis:** metrics interpretation, industry benchmarks, A/B testing \
methodology, cohort analysis, and ROI attribution.\n\
4. **Advanced Techniques:** behavioral triggers, cross-channel alignment, and advanced \
segmentation (RFM, predictive, behavioral).\n\n\
**Your Communication Style:**\n\
- Be practical, actionable, and data-driven\n\
- Provide specific examples when helpful\n\
- Explain the reasoning behind recommendations\n\
- Prioritize what to fix first\n"
        .to_string();

    if let Some(context) = context {
        let _ = write!(
            prompt,
            "\n**Current Email Performance Context:**\n{}\n\n\
Use this context to provide specific, data-driven recommendations based on actual performance.\n",
            context
        );
    }

    prompt
}

pub fn chat_prompt(
    question: &str,
    history: &[ChatMessage],
    context: Option<&str>,
) -> String {
    let recent = &history[history.len().saturating_sub(HISTORY_WINDOW)..];

    let conversation = if recent.is_empty() {
        "This is the start of the conversation.".to_string()
    } else {
        let mut text = String::new();
        for message in recent {
            let speaker = match message.role {
                ChatRole::User => "User",
                ChatRole::Assistant => "Expert",
            };
            let _ = writeln!(text, "{}: {}\n", speaker, message.content);
        }
        text
    };

    format!(
        "{}\n\
**Conversation History:**\n{}\n\
**Current User Question:**\n{}\n\n\
**Your Response:**\n\
Provide a helpful, expert response that addresses the user's question. Be specific, \
actionable, and reference the email performance context if relevant.",
        expert_system_prompt(context),
        conversation,
        question
    )
}

pub fn critique_prompt(content: &str, subject: Option<&str>) -> String {
    let subject_section = subject
        .map(|s| format!("\n**Subject Line:**\n{}\n", s))
        .unwrap_or_default();

    format!(
        "{}\n\
**Email to Analyze:**\n{}\n\
**Email Content:**\n{}\n\n\
**Your Task:**\n\
Analyze this email in detail and provide specific, actionable recommendations for \
improvement. Cover:\n\
1. Subject line strengths, weaknesses, and alternatives (if a subject was provided)\n\
2. Content structure, clarity of the value proposition, and CTA effectiveness\n\
3. A prioritized list of improvements, most important first\n\
4. Overall assessment: what works, what needs immediate attention\n\n\
Provide a comprehensive, actionable analysis the email writer can use immediately.",
        expert_system_prompt(None),
        subject_section,
        content
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_prompt_keeps_only_the_most_recent_messages() {
        let history: Vec<ChatMessage> = (0..15)
            .map(|i| ChatMessage::user(format!("question number {}", i)))
            .collect();

        let prompt = chat_prompt("latest question", &history, None);

        assert!(!prompt.contains("question number 4"));
        assert!(prompt.contains("question number 5"));
        assert!(prompt.contains("question number 14"));
        assert!(prompt.contains("latest question"));
    }

    #[test]
    fn chat_prompt_marks_an_empty_history() {
        let prompt = chat_prompt("hello", &[], None);
        assert!(prompt.contains("start of the conversation"));
    }

    #[test]
    fn context_is_embedded_when_present() {
        let prompt = chat_prompt("hello", &[], Some("Average open rate: 41%"));
        assert!(prompt.contains("Average open rate: 41%"));
    }

    #[test]
    fn critique_prompt_omits_missing_subject() {
        let with = critique_prompt("body text", Some("Big sale"));
        let without = critique_prompt("body text", None);
        assert!(with.contains("Big sale"));
        assert!(!without.contains("**Subject Line:**"));
    }
}
