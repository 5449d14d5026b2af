use crate::domain::question::Question;
use serde_json::{Map, Value};

pub(crate) const QUESTIONS_SYSTEM_PROMPT: &str = r#"You are a veterinary triage assistant helping a pet owner before they see a vet. Read the owner's notes (and the photo, when one is attached) and choose up to 5 short follow-up questions whose answers would most change your assessment.
Return ONLY JSON in this exact format:
{"questions":[
  {"id":"duration_days","type":"number","label":"How many days has this been happening?","min":0,"max":30,"step":1,"required":true},
  {"id":"diet_change","type":"select","label":"Recent diet change?","options":["Yes","No","Not sure"],"required":true},
  {"id":"energy","type":"radio","label":"Energy level","options":["Normal","Slightly low","Very low"],"required":true},
  {"id":"signs","type":"checkbox","label":"Any of these signs?","options":["Vomiting","Diarrhea","Coughing","None"],"required":false},
  {"id":"eating","type":"yesno","label":"Is your pet eating normally?","required":true},
  {"id":"notes","type":"text","label":"Anything else to add?","placeholder":"Optional notes"}
]}
Allowed types: select, radio, checkbox, yesno, text, number. Ids are short snake_case and unique. If nothing useful can be asked, return {"questions":[]}."#;

pub(crate) const RESULTS_SYSTEM_PROMPT: &str = r#"You are a veterinary triage assistant providing informational, pre-vet guidance.
Never give a definitive diagnosis. Always recommend veterinary consultation for serious or persisting symptoms, be empathetic, and include conservative "see a vet if" thresholds.
Return ONLY JSON in this exact format:
{
  "diagnosis": {
    "title": "Possible diagnosis",
    "likely_condition": "Most likely condition in a few words",
    "other_possibilities": [{"name": "Condition", "likelihood": "Low|Medium|High"}],
    "urgency": {"badge": "Monitor|See a vet soon|Emergency", "level": "low|medium|high", "note": "One sentence on when to escalate"}
  },
  "care": {
    "title": "Care at home",
    "tips": [{"icon": "water", "text": "Short actionable tip"}],
    "disclaimer": "This is not a substitute for professional veterinary care."
  },
  "costs": {
    "title": "Estimated costs",
    "disclaimer": "Prices vary by region and clinic.",
    "steps": [{"icon": "stethoscope", "name": "Exam", "cost": "$50-$100", "desc": "What it involves", "likelihood": "Likely|Possible"}]
  }
}"#;

pub(crate) fn build_questions_user_prompt(symptoms: Option<&str>, has_image: bool) -> String {
    let mut body = String::new();
    body.push_str(&format!(
        "Owner notes: {}\n",
        symptoms.unwrap_or("(none provided)")
    ));
    if has_image {
        body.push_str("A photo of the pet is attached.\n");
    } else {
        body.push_str("No photo was provided.\n");
    }
    body
}

pub(crate) fn build_results_user_prompt(
    symptoms: Option<&str>,
    has_image: bool,
    questions: &[Question],
    answers: Option<&Map<String, Value>>,
) -> String {
    let mut body = build_questions_user_prompt(symptoms, has_image);

    match answers {
        Some(answers) if !answers.is_empty() => {
            body.push_str("\nFollow-up answers:\n");
            for (id, value) in answers {
                let label = questions
                    .iter()
                    .find(|q| &q.id == id)
                    .map(|q| q.label.as_str())
                    .unwrap_or(id.as_str());
                body.push_str(&format!("- {}: {}\n", label, answer_text(value)));
            }
        }
        _ => body.push_str("\nThe owner skipped the follow-up questions.\n"),
    }

    body
}

fn answer_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(answer_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
