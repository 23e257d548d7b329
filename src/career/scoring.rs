// src/career/scoring.rs
//! Heuristic scorers for the career tools.
//!
//! Everything here is a pure function of its input text plus fixed keyword
//! and pattern tables; persistence and validation live in the handlers.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Action-verb keywords scanned for in resume text
pub const RESUME_KEYWORDS: [&str; 15] = [
    "leadership",
    "managed",
    "developed",
    "implemented",
    "achieved",
    "increased",
    "reduced",
    "improved",
    "collaborated",
    "designed",
    "led",
    "created",
    "launched",
    "optimized",
    "scaled",
];

fn metrics_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\d+%|\$\d+|\d+\s*(?:users|customers|revenue|growth|reduction|increase)")
            .expect("metrics pattern is valid")
    })
}

#[derive(Debug, Serialize)]
pub struct ResumeAnalysis {
    pub score: i64,
    pub tips: Vec<String>,
    pub found_keywords: Vec<String>,
    pub has_metrics: bool,
}

/// Score a resume text. The caller is responsible for rejecting texts with a
/// trimmed length below 20 characters before calling this.
pub fn analyze_resume(text: &str) -> ResumeAnalysis {
    let lower = text.to_lowercase();
    let length = text.chars().count();

    let has_metrics = metrics_regex().is_match(text);

    let mut found_keywords: Vec<String> = Vec::new();
    let mut missing_keywords: Vec<String> = Vec::new();
    for keyword in RESUME_KEYWORDS {
        if lower.contains(keyword) {
            found_keywords.push(keyword.to_string());
        } else {
            missing_keywords.push(keyword.to_string());
        }
    }

    let mut score = 8 * found_keywords.len() as i64 + 20;
    if has_metrics {
        score += 25;
    }
    if length > 150 {
        score += 15;
    }
    let score = score.min(100);

    // Tips fire in fixed order; the generic set only appears when nothing
    // else did.
    let mut tips: Vec<String> = Vec::new();
    if !has_metrics {
        tips.push(
            "Add quantifiable metrics (percentages, dollar amounts, user counts) to show impact"
                .to_string(),
        );
    }
    if found_keywords.len() < 3 {
        let suggestions: Vec<&str> = missing_keywords
            .iter()
            .take(5)
            .map(String::as_str)
            .collect();
        tips.push(format!(
            "Work in more action verbs, for example: {}",
            suggestions.join(", ")
        ));
    }
    if length < 150 {
        tips.push("Expand your resume with specific examples of your work".to_string());
    }
    if !lower.contains("project") && !lower.contains("initiative") {
        tips.push("Highlight projects or initiatives you contributed to".to_string());
    }

    if tips.is_empty() {
        tips.push("Tailor your wording to each job description you apply to".to_string());
        tips.push("Keep formatting consistent and easy to scan".to_string());
        tips.push("Lead each bullet with your strongest accomplishment".to_string());
    }

    found_keywords.truncate(5);

    ResumeAnalysis {
        score,
        tips,
        found_keywords,
        has_metrics,
    }
}

// ============================================================================
// Interview response scoring (STAR rubric)
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StarComponents {
    pub situation: bool,
    pub task: bool,
    pub action: bool,
    pub result: bool,
}

#[derive(Debug, Serialize)]
pub struct InterviewAnalysis {
    pub score: i64,
    pub feedback: Vec<String>,
    pub word_count: usize,
    pub star_components: StarComponents,
}

fn star_regexes() -> &'static [(&'static str, Regex); 4] {
    static RES: OnceLock<[(&'static str, Regex); 4]> = OnceLock::new();
    RES.get_or_init(|| {
        [
            (
                "Situation",
                Regex::new(r"(?i)situation|context|background").expect("situation pattern"),
            ),
            (
                "Task",
                Regex::new(r"(?i)task|goal|objective|challenge").expect("task pattern"),
            ),
            (
                "Action",
                Regex::new(r"(?i)action|did|implemented|executed|performed").expect("action pattern"),
            ),
            (
                "Result",
                Regex::new(r"(?i)result|outcome|impact|achieved|accomplished")
                    .expect("result pattern"),
            ),
        ]
    })
}

/// Score an interview response against the STAR rubric. The caller validates
/// that the response is non-blank first.
pub fn analyze_interview_response(response: &str) -> InterviewAnalysis {
    let regexes = star_regexes();
    let present: Vec<bool> = regexes.iter().map(|(_, re)| re.is_match(response)).collect();

    let star_score = 25 * present.iter().filter(|p| **p).count() as i64;

    let word_count = response.split_whitespace().count();
    let length_score = ((word_count as i64 / 10) * 5).min(30);
    let score = (star_score + length_score + 10).min(100);

    let mut feedback: Vec<String> = Vec::new();
    for ((name, _), is_present) in regexes.iter().zip(present.iter()) {
        if !is_present {
            feedback.push(format!(
                "Describe the {} part of your answer more explicitly",
                name.to_lowercase()
            ));
        }
    }
    if word_count < 50 {
        feedback.push("Your answer is quite short; aim for at least 50 words".to_string());
    }

    if feedback.is_empty() {
        feedback.push("Strong, well-structured answer - keep practicing".to_string());
        feedback.push("Try varying the prompt to cover more scenarios".to_string());
    }

    InterviewAnalysis {
        score,
        feedback,
        word_count,
        star_components: StarComponents {
            situation: present[0],
            task: present[1],
            action: present[2],
            result: present[3],
        },
    }
}

// ============================================================================
// Confidence pulse
// ============================================================================

/// Blend interview-practice volume/quality and application activity into a
/// single 0-100 engagement metric. The three caps sum to exactly 100, so the
/// result needs no extra clamp.
pub fn confidence_pulse(interview_count: i64, avg_score: f64, total_applications: i64) -> i64 {
    let interview_weight = ((interview_count * 8) as f64).min(40.0);
    let score_weight = (avg_score * 0.3).min(30.0);
    let activity_weight = ((total_applications * 3) as f64).min(30.0);

    (interview_weight + score_weight + activity_weight).round() as i64
}
