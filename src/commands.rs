//! Text commands understood by the bot, and their fixed replies.

pub const PREFIX: char = '!';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `!buscar <texto>`, the term may be empty.
    Search(String),
    /// `!categoria <nombre>`, the term may be empty.
    Category(String),
    Ping,
    /// Run one offers posting cycle now.
    Post,
    /// Reload the catalog now.
    Reload,
    Help,
}

/// Parses a message. Returns `None` for anything that is not a known command.
pub fn parse(content: &str) -> Option<Command> {
    let rest = content.strip_prefix(PREFIX)?;
    let (word, args) = match rest.split_once(char::is_whitespace) {
        Some((word, args)) => (word, args.trim()),
        None => (rest, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "buscar" | "search" => Command::Search(args.to_string()),
        "categoria" | "category" => Command::Category(args.to_string()),
        "ping" => Command::Ping,
        "postear" | "post" => Command::Post,
        "recargar" | "reload" => Command::Reload,
        "ayuda" | "help" => Command::Help,
        _ => return None,
    };
    Some(command)
}

pub fn search_usage() -> &'static str {
    "🔎 Usa: `!buscar <texto>`"
}

pub fn category_usage() -> &'static str {
    "🏷️ Usa: `!categoria <nombre>`"
}

pub fn no_search_results(term: &str) -> String {
    format!("❌ Sin resultados para: **{}**", term.to_lowercase())
}

pub fn no_category_results(category: &str) -> String {
    format!("❌ No se encontraron productos en: **{}**", category.to_lowercase())
}

pub fn help_text() -> String {
    [
        "**Comandos disponibles**",
        "`!buscar <texto>` busca productos por nombre o categoría",
        "`!categoria <nombre>` lista productos de una categoría",
        "`!ping` comprueba que el bot está activo",
        "`!postear` publica la siguiente oferta ahora",
        "`!recargar` vuelve a cargar el catálogo",
        "`!ayuda` muestra esta ayuda",
    ]
    .join("\n")
}
