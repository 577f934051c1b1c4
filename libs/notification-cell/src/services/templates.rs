use chrono::NaiveDateTime;

use shared_models::auth::Role;

use crate::models::Message;

const SIGNATURE: &str = "Best regards,\nAyurSutra Team";

pub fn welcome(name: &str, role: Role) -> Message {
    Message {
        subject: "Welcome to AyurSutra!".to_string(),
        body: format!(
            "Dear {},\n\nWelcome to AyurSutra - your Panchakarma management system.\n\
             Your account has been created as: {}\n\nNamaste!\n{}",
            name, role, SIGNATURE
        ),
    }
}

pub fn session_reminder(name: &str, procedure: &str, scheduled: NaiveDateTime) -> Message {
    Message {
        subject: format!("Session Reminder: {}", procedure),
        body: format!(
            "Dear {},\n\nThis is a reminder for your upcoming Panchakarma session:\n\
             Procedure: {}\nScheduled: {}\n\nPlease arrive 15 minutes early.\n\n{}",
            name,
            procedure,
            scheduled.format("%Y-%m-%d %H:%M"),
            SIGNATURE
        ),
    }
}

pub fn pre_procedure_instructions(name: &str, procedure: &str) -> Message {
    Message {
        subject: format!("Preparing for {}", procedure),
        body: format!(
            "Dear {},\n\nPlease follow these instructions before your {} session:\n{}\n\n{}",
            name,
            procedure,
            bullet_list(preparation_for(procedure)),
            SIGNATURE
        ),
    }
}

pub fn post_procedure_tips(name: &str, procedure: &str) -> Message {
    Message {
        subject: format!("Recovery Tips after {}", procedure),
        body: format!(
            "Dear {},\n\nYour {} session is complete. For the best results:\n{}\n\n{}",
            name,
            procedure,
            bullet_list(recovery_for(procedure)),
            SIGNATURE
        ),
    }
}

pub fn feedback_request(name: &str, procedure: &str) -> Message {
    Message {
        subject: format!("Feedback Request: {}", procedure),
        body: format!(
            "Dear {},\n\nYour session '{}' has been completed.\n\
             Please take a moment to share your feedback.\n\nThank you,\nAyurSutra Team",
            name, procedure
        ),
    }
}

fn bullet_list(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|line| format!("- {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn preparation_for(procedure: &str) -> &'static [&'static str] {
    let procedure = procedure.to_ascii_lowercase();
    if procedure.contains("vamana") || procedure.contains("virechana") {
        &[
            "Follow the prescribed ghee intake (snehapana) schedule exactly",
            "Eat only light, warm food the evening before",
            "Do not eat anything on the morning of the procedure",
        ]
    } else if procedure.contains("basti") {
        &[
            "Take a light meal at least 2 hours before the session",
            "Empty your bowels before arriving",
        ]
    } else if procedure.contains("nasya") {
        &[
            "Avoid cold water and cold drinks on the day of the session",
            "Do not wash your hair before the session",
        ]
    } else {
        &[
            "Avoid heavy meals for 3 hours before the session",
            "Wear loose, comfortable clothing",
            "Stay well hydrated with warm water",
        ]
    }
}

fn recovery_for(procedure: &str) -> &'static [&'static str] {
    let procedure = procedure.to_ascii_lowercase();
    if procedure.contains("vamana") || procedure.contains("virechana") {
        &[
            "Follow the graduated diet (samsarjana krama) starting with thin rice gruel",
            "Rest and avoid travel for the remainder of the day",
        ]
    } else if procedure.contains("shirodhara") || procedure.contains("nasya") {
        &[
            "Keep your head covered and avoid wind exposure",
            "Avoid screens and loud environments for a few hours",
        ]
    } else {
        &[
            "Rest and avoid strenuous activity today",
            "Drink warm water and eat light, freshly cooked food",
            "Avoid cold showers and cold food for 24 hours",
        ]
    }
}
