use super::client::Sampling;

/// Characters of exhibit text sent with the summary prompt
pub const SUMMARY_CHARS: usize = 4500;
/// Characters of exhibit text sent with follow-up and next-step prompts
pub const ADVICE_CHARS: usize = 3500;

/// Stand-in for an exhibit with no text
pub const NO_READABLE_CONTENT: &str = "No readable content found.";

pub const TEXT_SUMMARY: Sampling = Sampling {
    temperature: 0.1,
    top_p: 0.1,
    max_tokens: Some(600),
};
pub const TEXT_FOLLOW_UPS: Sampling = Sampling {
    temperature: 0.2,
    top_p: 0.5,
    max_tokens: Some(300),
};
pub const TEXT_NEXT_STEPS: Sampling = Sampling {
    temperature: 0.35,
    top_p: 0.9,
    max_tokens: Some(300),
};
pub const IMAGE_DESCRIPTION: Sampling = Sampling {
    temperature: 0.1,
    top_p: 0.1,
    max_tokens: Some(700),
};
pub const IMAGE_FOLLOW_UPS: Sampling = Sampling {
    temperature: 0.2,
    top_p: 0.5,
    max_tokens: Some(200),
};
pub const IMAGE_NEXT_STEPS: Sampling = Sampling {
    temperature: 0.35,
    top_p: 0.9,
    max_tokens: Some(200),
};
pub const INDICATORS: Sampling = Sampling {
    temperature: 0.1,
    top_p: 0.1,
    max_tokens: None,
};

pub const SUMMARIZER_ROLE: &str =
    "You are a precise legal summarizer for subrogation demand packages.";
pub const ADJUSTER_ROLE: &str = "You are assisting a subrogation adjuster.";
pub const STRATEGIST_ROLE: &str = "You are a subrogation strategist giving actionable next steps.";
pub const PHOTO_ROLE: &str = "You are a legal assistant specialized in photo evidence.";
pub const LITIGATION_STRATEGIST_ROLE: &str = "You are a litigation strategist.";
pub const CLAIMS_ASSISTANT_ROLE: &str = "You are an insurance claims assistant.";

pub const PHOTO_INSTRUCTIONS: &str = "Describe this photo evidence in factual terms suitable \
for an external demand package. Focus on what is visible (vehicle types, damage location, \
environmental conditions). Keep to 3 concise factual bullets.";

/// First `max` characters of `text`, never splitting a code point
pub fn head_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn summary_prompt(content: &str) -> String {
    format!(
        "Produce a concise factual summary for inclusion in a demand package. \
Keep to 3 short bullets (facts only: who, what, when, damages, liability). \
Do NOT include recommendations or internal notes.\n\nEXHIBIT CONTENT:\n{}",
        head_chars(content, SUMMARY_CHARS)
    )
}

pub fn follow_up_prompt(content: &str) -> String {
    format!(
        "Provide the top 2-3 follow-up questions an adjuster should ask based on the exhibit. \
Return ONLY the questions as a short numbered list (no explanation).\n\nEXHIBIT CONTENT:\n{}",
        head_chars(content, ADVICE_CHARS)
    )
}

pub fn next_steps_prompt(content: &str) -> String {
    format!(
        "Provide the top 2-3 recommended next steps for the adjuster (short, numbered list). \
Be actionable (e.g., verify X, obtain Y, contact Z).\n\nEXHIBIT CONTENT:\n{}",
        head_chars(content, ADVICE_CHARS)
    )
}

pub fn photo_follow_up_prompt(description: &str) -> String {
    format!(
        "PHOTO DESCRIPTION:\n{}\n\nBased on the photo description above, list the top 2 \
follow-up questions an adjuster should ask. Return only the numbered questions.",
        description
    )
}

pub fn photo_next_steps_prompt(description: &str) -> String {
    format!(
        "PHOTO DESCRIPTION:\n{}\n\nBased on the photo description above, provide the top 2 \
recommended next steps for the adjuster. Return as a short numbered list.",
        description
    )
}

/// Litigation topics and the questions asked about each, in prompt order
pub const LITIGATION_TOPICS: &[(&str, &[&str])] = &[
    (
        "Injury at scene",
        &[
            "Is the injury reported on scene?",
            "Is there any medical treatment received?",
            "Is there an ambulance on scene?",
            "What is the time duration between loss reported and receiving medical treatment?",
        ],
    ),
    (
        "Photographs",
        &[
            "Is there any photograph of the vehicle?",
            "What is the extent of damage to the vehicle?",
            "Are the photographs admissible?",
        ],
    ),
    (
        "Mechanism of injury",
        &[
            "Is there any medical testimony available?",
            "Are the plaintiff's injuries disputed by credible medical or biomechanical testimony?",
        ],
    ),
    ("Venue", &["Is the venue plaintiff friendly?"]),
    (
        "Medical treatment issues",
        &["Is there a significant gap in medical treatments?"],
    ),
    (
        "Pre-existing conditions",
        &[
            "Is the plaintiff an egg-shell plaintiff?",
            "Are the plaintiff's pre-existing conditions related to the accident?",
        ],
    ),
    (
        "Plaintiff's Attorney/ Law Firm",
        &[
            "Is the plaintiff's attorney an exceptional litigator?",
            "Does plaintiff's counsel handle a high volume of lawsuits?",
        ],
    ),
    ("Police report", &["Is the police report available?"]),
    (
        "Body part injury",
        &[
            "Has the plaintiff received any injury?",
            "What is the extent of injury received?",
        ],
    ),
    (
        "Driver",
        &[
            "Is the driver insured?",
            "Is the driver available for testimony?",
        ],
    ),
    (
        "Vehicle",
        &[
            "Is the vehicle insured or rental?",
            "What is the number of vehicles involved in the accident?",
        ],
    ),
    (
        "State",
        &["Is the loss state different from the jurisdiction state?"],
    ),
    (
        "ISO",
        &[
            "Does the plaintiff have any meaningful ISO entries?",
            "Does the medical provider have any meaningful ISO entries?",
        ],
    ),
    (
        "Statute of Limitations",
        &["Has the lawsuit been filed within the applicable statute of limitations?"],
    ),
];

const INDICATOR_RULES: &str = "\
- For each topic, compile a single, concise list of all identified potential litigation indicators.
- If a relevant red flag for a specific question is found, include that specific red flag in the list.
- Do not include the original question in the output. Instead, directly state the identified indicator.
- If no information or red flag is found for any question within a topic, explicitly state \"No indicators found in claim notes.\" for that entire topic.
- The output for each topic should begin with the topic name itself on its own line. Do not add the prefix 'Topic:'.
- Use only bullet points (\u{2022}). Do not use numbers or paragraphs.
- Do not use any generic information or information outside the provided claim notes.
- Do not provide suggestions, recommendations, conclusions, or opinions. Only state facts from the notes.
- Do not change or manipulate any fact.";

/// Build the litigation-indicator prompt around the claim notes
pub fn indicator_prompt(notes: &str) -> String {
    let mut topics = String::new();
    for (topic, questions) in LITIGATION_TOPICS {
        topics.push_str(&format!("\n### {}\n", topic));
        for q in *questions {
            topics.push_str(&format!("- {}\n", q));
        }
    }

    format!(
        "### CORE TASK\n\
Your job is to thoroughly analyze the following CLAIM NOTES to identify and list all potential \
litigation indicators. Structure your analysis based on the TOPICS & QUESTIONS provided.\n\n\
### CLAIM NOTES TO ANALYZE\n{}\n\n\
### TOPICS & QUESTIONS TO ADDRESS\n{}\n\
### OUTPUT FORMATTING RULES\n{}\n",
        notes.trim(),
        topics,
        INDICATOR_RULES
    )
}
