use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{CourseStatus, Level};

/// What the user wants done with the course catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Availability,
}

/// A detail field the user asked to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detail {
    Price,
    Teacher,
    Duration,
    StartDate,
    Description,
}

/// Structured reading of one chat message. Built per request, discarded after
/// the reply is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub topic: bool,
    pub action: Option<Action>,
    pub level: Option<Level>,
    pub status: Option<CourseStatus>,
    pub details: Vec<Detail>,
}

fn pattern(raw: &str) -> Regex {
    Regex::new(raw).expect("intent pattern must compile")
}

static GREETING: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"\bhola\b|\bbuenos dias\b|\bbuenas tardes\b|\bbuenas noches\b|\bsaludos\b|\bhey\b|\bhi\b|\bhello\b",
    )
});

static THANKS: Lazy<Regex> =
    Lazy::new(|| pattern(r"\bgracias\b|\bagradezco\b|\bthank you\b|\bthanks\b"));

static TOPIC: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"\bcursos?\b|\bmaterias?\b|\basignaturas?\b|\bclases?\b|\btalleres?\b|\bformacion\b|\beducacion\b",
    )
});

static ACTION_LIST: Lazy<Regex> =
    Lazy::new(|| pattern(r"\blistar\b|\bver\b|\bmostrar\b|\bconsultar\b|\bbuscar\b"));

static ACTION_AVAILABILITY: Lazy<Regex> =
    Lazy::new(|| pattern(r"\bdisponibles?\b|\bhabra\b|\bhay\b|\bquedan\b"));

// First match wins, checked in declaration order.
static LEVELS: Lazy<Vec<(Regex, Level)>> = Lazy::new(|| {
    vec![
        (pattern(r"\bbasicos?\b|\binicial\b|\bprincipiante\b"), Level::Basic),
        (pattern(r"\bintermedios?\b|\bmedio\b"), Level::Intermediate),
        (pattern(r"\bavanzados?\b|\bexperto\b"), Level::Advanced),
    ]
});

static STATUSES: Lazy<Vec<(Regex, CourseStatus)>> = Lazy::new(|| {
    vec![
        (pattern(r"\bactivos?\b|\bdisponibles?\b|\babiertos?\b"), CourseStatus::Active),
        (pattern(r"\bcompletados?\b|\bterminados?\b|\bfinalizados?\b"), CourseStatus::Completed),
        (pattern(r"\binactivos?\b|\bcerrados?\b"), CourseStatus::Inactive),
    ]
});

// Unlike levels and statuses, details accumulate: every matching group
// contributes its field.
static DETAILS: Lazy<Vec<(Regex, Detail)>> = Lazy::new(|| {
    vec![
        (pattern(r"\bprecio\b|\bcosto\b|\bvalor\b|\btarifa\b"), Detail::Price),
        (pattern(r"\bprofesor\b|\bdocente\b|\binstructor\b|\bmaestro\b"), Detail::Teacher),
        (pattern(r"\bduracion\b|\bhoras\b|\btiempo\b|\bsemanas?\b|\bmeses?\b"), Detail::Duration),
        (pattern(r"\bfecha\b|\binicio\b|\bcomienzo\b|\bempezar\b"), Detail::StartDate),
        (pattern(r"\bdescripcion\b|\bque es\b|\ben que consiste\b"), Detail::Description),
    ]
});

pub fn is_greeting(text: &str) -> bool {
    GREETING.is_match(text)
}

pub fn is_thanks(text: &str) -> bool {
    THANKS.is_match(text)
}

/// Reads topic, action, filters and requested details out of a lowercased
/// message. Categories are independent; within the level and status groups the
/// first matching pattern wins.
pub fn extract(text: &str) -> Intent {
    let action = if ACTION_LIST.is_match(text) {
        Some(Action::List)
    } else if ACTION_AVAILABILITY.is_match(text) {
        Some(Action::Availability)
    } else {
        None
    };

    let level = LEVELS
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, level)| *level);

    let status = STATUSES
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, status)| *status);

    let details = DETAILS
        .iter()
        .filter(|(re, _)| re.is_match(text))
        .map(|(_, detail)| *detail)
        .collect();

    Intent {
        topic: TOPIC.is_match(text),
        action,
        level,
        status,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_course_topic_synonyms() {
        assert!(extract("quiero ver las materias").topic);
        assert!(extract("hay talleres de pintura?").topic);
        assert!(!extract("quiero hablar con un humano").topic);
    }

    #[test]
    fn list_verbs_win_over_availability_words() {
        let intent = extract("mostrar cursos disponibles");
        assert_eq!(intent.action, Some(Action::List));
    }

    #[test]
    fn availability_without_list_verb() {
        let intent = extract("hay cupos en los cursos?");
        assert_eq!(intent.action, Some(Action::Availability));
    }

    #[test]
    fn first_level_group_wins() {
        // "inicial" and "medio" both present: the basic group is checked first.
        let intent = extract("curso inicial o medio");
        assert_eq!(intent.level, Some(Level::Basic));
    }

    #[test]
    fn status_defaults_to_none_when_unmentioned() {
        let intent = extract("listar cursos de python");
        assert_eq!(intent.status, None);
    }

    #[test]
    fn disponibles_sets_status_and_action() {
        let intent = extract("cursos disponibles");
        assert_eq!(intent.status, Some(CourseStatus::Active));
        assert_eq!(intent.action, Some(Action::Availability));
    }

    #[test]
    fn details_accumulate_across_groups() {
        let intent = extract("precio y duracion de los cursos");
        assert!(intent.details.contains(&Detail::Price));
        assert!(intent.details.contains(&Detail::Duration));
        assert_eq!(intent.details.len(), 2);
    }

    #[test]
    fn accented_words_do_not_match_ascii_patterns() {
        // The pattern tables are ASCII on purpose.
        let intent = extract("cursos básicos");
        assert_eq!(intent.level, None);
        assert!(intent.topic);
    }

    #[test]
    fn greeting_and_thanks_probes() {
        assert!(is_greeting("hola, buen dia"));
        assert!(is_greeting("hello there"));
        assert!(!is_greeting("quiero cursos"));
        assert!(is_thanks("muchas gracias"));
        assert!(!is_thanks("gra cias"));
    }
}
