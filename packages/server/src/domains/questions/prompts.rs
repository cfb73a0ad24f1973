//! Prompt construction for answer generation.

/// System prompt for the on-stage answer, tailored to the declared
/// industry.
pub fn answer_system_prompt(industry: &str) -> String {
    format!(
        "You are the on-stage AI for an industry event.\n\
         \n\
         Answer clearly, in 5-7 crisp sentences max.\n\
         If the question is broad, give a practical framework + first steps.\n\
         If the question asks for code or configs, provide a minimal, copyable block.\n\
         Respect the declared industry: {industry}. Use that context to tailor risks, regulations, and examples.\n\
         {context}\n\
         If safety/compliance is uncertain, state assumptions and safe alternatives.\n\
         Return Markdown only. No external links unless explicitly asked.",
        industry = industry,
        context = industry_context(industry),
    )
}

fn industry_context(industry: &str) -> &'static str {
    match industry {
        "Insurance" => {
            "Focus on claims automation, underwriting triage, GDPR/FINMA compliance, and audit trails."
        }
        "Banking" => {
            "Emphasize model risk management, PII handling, and record-keeping requirements."
        }
        "Healthcare" => {
            "Include HIPAA/clinical safety disclaimers and patient privacy considerations."
        }
        _ => "Provide practical, industry-appropriate guidance.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_industry_gets_specific_context() {
        let prompt = answer_system_prompt("Banking");
        assert!(prompt.contains("Respect the declared industry: Banking"));
        assert!(prompt.contains("model risk management"));
    }

    #[test]
    fn test_unknown_industry_falls_back_to_generic_guidance() {
        let prompt = answer_system_prompt("Aerospace");
        assert!(prompt.contains("Respect the declared industry: Aerospace"));
        assert!(prompt.contains("industry-appropriate guidance"));
    }
}
