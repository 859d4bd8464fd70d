use rand::Rng;

use crate::models::{CourseStatus, CourseSummary};

use super::intent::{Action, Detail, Intent};

pub const GREETING_REPLY: &str = "¡Hola! 👋 Soy el asistente virtual de cursos del sistema.\n\n\
Puedo ayudarte con información sobre:\n\
• Lista de cursos disponibles\n\
• Cursos por nivel (Básico, Intermedio, Avanzado)\n\
• Cupos disponibles\n\
• Precios y duración\n\
• Fechas de inicio\n\
• Profesores\n\n\
¿En qué puedo ayudarte hoy?";

pub const THANKS_REPLIES: [&str; 4] = [
    "¡De nada! Estoy aquí para ayudarte con cualquier consulta sobre cursos. 😊",
    "¡Es un placer ayudarte! No dudes en preguntar si necesitas más información.",
    "¡Gracias a ti! Que tengas un excelente día de aprendizaje.",
    "¡Con gusto! Recuerda que puedes consultarme sobre cursos en cualquier momento.",
];

pub const FALLBACK_REPLY: &str = "Parece que estás preguntando sobre nuestros cursos. ¿Te gustaría saber:\n\
1. ¿Qué cursos hay disponibles?\n\
2. ¿Qué cursos tienen cupos libres?\n\
3. ¿Qué cursos hay por nivel (básico, intermedio, avanzado)?\n\
4. ¿Cuáles son los precios de los cursos?\n\n\
Por favor, especifica tu pregunta.";

pub const NO_MATCH_REPLY: &str =
    "No hay cursos disponibles con esos criterios en este momento.";

pub const NO_SEATS_REPLY: &str = "Actualmente no hay cursos con cupos disponibles. \
Te sugerimos revisar otros cursos o contactarnos para más información.";

const AVAILABILITY_HEADER: &str = "📚 **Cursos disponibles con cupos:**\n";
const PRICE_HEADER: &str = "💰 **Cursos disponibles con precios:**\n";
const TEACHER_HEADER: &str = "👨‍🏫 **Cursos por profesor:**\n";
const LIST_HEADER: &str = "📖 **Cursos disponibles:**\n";

const HINT_LINE: &str = "\n💡 *Puedes preguntar por: precios, profesores, duración o descripción específica de algún curso.*";

const DESCRIPTION_PREVIEW_CHARS: usize = 100;

/// Terminal states of reply selection.
#[derive(Debug)]
enum Reply<'a> {
    NoTopic,
    NoMatch,
    NoSeats,
    Availability(Vec<&'a CourseSummary>),
    Listing(Vec<&'a CourseSummary>),
}

pub fn thanks_reply<R: Rng>(rng: &mut R) -> &'static str {
    THANKS_REPLIES[rng.random_range(0..THANKS_REPLIES.len())]
}

/// Level/status filter plus ascending start-date order. The sort is stable, so
/// same-day courses keep their catalog order.
fn filter_catalog<'a>(intent: &Intent, catalog: &'a [CourseSummary]) -> Vec<&'a CourseSummary> {
    let status = intent.status.unwrap_or(CourseStatus::Active);
    let mut courses: Vec<&CourseSummary> = catalog
        .iter()
        .filter(|c| intent.level.is_none_or(|level| c.level == level))
        .filter(|c| c.status == status)
        .collect();
    courses.sort_by_key(|c| c.start_date);
    courses
}

fn select<'a>(intent: &Intent, catalog: &'a [CourseSummary]) -> Reply<'a> {
    if !intent.topic {
        return Reply::NoTopic;
    }

    let courses = filter_catalog(intent, catalog);
    if courses.is_empty() {
        return Reply::NoMatch;
    }

    match intent.action {
        Some(Action::Availability) => {
            let with_seats: Vec<&CourseSummary> = courses
                .into_iter()
                .filter(|c| c.open_seats() > 0)
                .collect();
            if with_seats.is_empty() {
                Reply::NoSeats
            } else {
                Reply::Availability(with_seats)
            }
        }
        _ => Reply::Listing(courses),
    }
}

/// Renders the reply for an extracted intent against a catalog snapshot.
pub fn compose(intent: &Intent, catalog: &[CourseSummary]) -> String {
    match select(intent, catalog) {
        Reply::NoTopic => FALLBACK_REPLY.to_string(),
        Reply::NoMatch => NO_MATCH_REPLY.to_string(),
        Reply::NoSeats => NO_SEATS_REPLY.to_string(),
        Reply::Availability(courses) => render_availability(&courses),
        Reply::Listing(courses) => render_listing(intent, &courses),
    }
}

fn render_availability(courses: &[&CourseSummary]) -> String {
    let mut parts = vec![AVAILABILITY_HEADER.to_string()];

    for course in courses {
        parts.push(format!(
            "• **{}** ({})\n  Código: {}\n  Cupos disponibles: {}/{}\n  Inicia: {}\n  Precio: ${:.2}\n  Profesor: {}\n",
            course.name,
            course.level.label(),
            course.code,
            course.open_seats(),
            course.max_capacity,
            course.start_date,
            course.price,
            course.teacher,
        ));
    }

    finish(parts)
}

fn render_listing(intent: &Intent, courses: &[&CourseSummary]) -> String {
    let header = if intent.details.contains(&Detail::Price) {
        PRICE_HEADER
    } else if intent.details.contains(&Detail::Teacher) {
        TEACHER_HEADER
    } else {
        LIST_HEADER
    };
    let mut parts = vec![header.to_string()];

    for course in courses {
        let mut line = format!("• **{}**", course.name);

        if intent.level.is_none() {
            line.push_str(&format!(" [{}]", course.level.letter()));
        }

        let seats = course.open_seats();
        if seats > 0 {
            line.push_str(&format!(" ({seats} cupos disponibles)"));
        } else {
            line.push_str(" (CUPO COMPLETO)");
        }

        if intent.details.contains(&Detail::Price) {
            line.push_str(&format!(" - ${:.2}", course.price));
        }
        if intent.details.contains(&Detail::Duration) {
            line.push_str(&format!(" - {} horas", course.duration_hours));
        }
        if intent.details.contains(&Detail::StartDate) {
            line.push_str(&format!(" - Inicia: {}", course.start_date));
        }
        if intent.details.contains(&Detail::Teacher) {
            line.push_str(&format!(" - Prof: {}", course.teacher));
        }
        if intent.details.contains(&Detail::Description) && !course.description.is_empty() {
            let preview: String = course
                .description
                .chars()
                .take(DESCRIPTION_PREVIEW_CHARS)
                .collect();
            line.push_str(&format!("\n  📝 {preview}..."));
        }

        parts.push(line);
    }

    finish(parts)
}

fn finish(mut parts: Vec<String>) -> String {
    if parts.len() > 1 {
        parts.push(HINT_LINE.to_string());
    }
    parts.join("\n")
}
