//! Canned reply texts and link templates.

use crate::config::ReplyConfig;

pub const GREETING_MENU: &str = "🙌Hola Bienvenido al EduBot de ÉLITE tenemos las siguientes opciones para tí:

-*Beneficios*
-*Solicitar una inscripcion*
-*Renovar Pago de mensualidad*

🟢 DIRECCIÓN:
 CALLE BOLIVAR  #347(4 casas más arriba del colegio de abogados)
2DA SEDE: CALLE BOLIVAR #294 (a espaldas de la genovesa o al costado de la cámara de comercio)";

pub const BENEFITS: &str = "💪📚 CALIDAD Y EXPERIENCIA....UNETE YA!!!
🟢BENEFICIOS y VENTAJAS DE ESTUDIAR EN LA ACADEMIA ÉLITE:
🛑Exámenes simulacros semanales
🛑Acceso a un drive:
✔️Prácticas
✔️Solucionarios
✔️Clases grabadas

🛑Acceso a libros con teoria y practicas para entrenar (digital)
🛑Profesores especialistas por cada curso
🛑Desarrollo de cursos segun tu canal.
🛑Tutoría y Mentoría
🛑Préstamo de libros para estudiar en casa con tu DNI";

pub const REQUEST_DOCUMENT: &str = "Hola🙋🏻‍♀️ para renovar tu pago es necesario que nos envíes tu *DOCUMENTO DE IDENTIDAD*
EJEMPLO: DNI(8digitos) o CARNET DE EXTRANJERÍA(hasta 20 dígitos)";

pub const PAYMENTS_UP_TO_DATE: &str = "✅ Tus pagos están al día.";

pub const UNCLASSIFIED_PAYMENT: &str = "ℹ️ No pudimos determinar el estado de tu pago. Por favor comunícate con secretaría para revisarlo.";

pub const TRY_AGAIN_LATER: &str = "⏳ En este momento no podemos consultar tus pagos. Por favor inténtalo nuevamente en unos minutos.";

pub const NOT_YET_SUPPORTED: &str = "🛠️ Esta opción todavía no está disponible por este medio. Escribe *Hola* para ver el menú de opciones.";

pub const FALLBACK: &str = "No logré entender tu solicitud 🤖";

/// Enrollment link text.
pub fn enrollment_link(config: &ReplyConfig) -> String {
    format!(
        "Claro que si te estaremos redirigiendo a este enlace para tu suscripcion:\n{}",
        config.enrollment_url
    )
}

/// Renewal URL for a document, with the document as a query parameter.
pub fn renewal_url(config: &ReplyConfig, document: &str) -> String {
    match reqwest::Url::parse_with_params(&config.renewal_url, &[("documento", document)]) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}?documento={}", config.renewal_url, document),
    }
}

/// Overdue reply carrying the renewal link.
pub fn overdue(link: &str) -> String {
    format!("⚠️ Toca renovar aquí: {link}")
}

/// Congratulation sent after an enrollment form is received.
pub fn enrollment_received(first_names: &str) -> String {
    format!("✅ Felicitaciones {first_names}, recibimos tu inscripción. Pronto nos comunicaremos contigo.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renewal_url_carries_document() {
        let config = ReplyConfig::default();
        let url = renewal_url(&config, "12345678");
        assert!(url.starts_with(&config.renewal_url));
        assert!(url.ends_with("?documento=12345678"));
    }

    #[test]
    fn renewal_url_appends_to_existing_query() {
        let config = ReplyConfig {
            renewal_url: "https://pay.example/renovar?src=wa".into(),
            ..ReplyConfig::default()
        };
        let url = renewal_url(&config, "AB1234567");
        assert_eq!(url, "https://pay.example/renovar?src=wa&documento=AB1234567");
    }

    #[test]
    fn enrollment_link_includes_url() {
        let config = ReplyConfig::default();
        assert!(enrollment_link(&config).contains(&config.enrollment_url));
    }

    #[test]
    fn overdue_reply_embeds_link() {
        assert_eq!(
            overdue("https://x/r?documento=1"),
            "⚠️ Toca renovar aquí: https://x/r?documento=1"
        );
    }
}
