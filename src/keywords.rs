use std::collections::HashMap;
use std::fs;

use anyhow::Result;

use crate::scanner::token::TokenType;

/// Builds the keyword table the scanner matches identifiers against. With no
/// path this is the fixed default table; a JSON file mapping canonical
/// keyword names to surface spellings re-skins the keywords.
pub fn load_keywords(path: Option<&str>) -> Result<HashMap<String, TokenType>> {
    let map: HashMap<String, String> = match path {
        Some(p) => {
            let contents = fs::read_to_string(p)?;
            serde_json::from_str(&contents)?
        }
        None => default_keywords(),
    };

    let mut keywords = HashMap::new();
    for (key, value) in map {
        if let Some(token_type) = str_to_token_type(&key) {
            keywords.insert(value, token_type);
        }
    }

    Ok(keywords)
}

fn default_keywords() -> HashMap<String, String> {
    HashMap::from([
        ("and".into(), "and".into()),
        ("class".into(), "class".into()),
        ("else".into(), "else".into()),
        ("false".into(), "false".into()),
        ("fun".into(), "fun".into()),
        ("for".into(), "for".into()),
        ("if".into(), "if".into()),
        ("nil".into(), "nil".into()),
        ("or".into(), "or".into()),
        ("print".into(), "print".into()),
        ("return".into(), "return".into()),
        ("super".into(), "super".into()),
        ("this".into(), "this".into()),
        ("true".into(), "true".into()),
        ("var".into(), "var".into()),
        ("while".into(), "while".into()),
    ])
}

fn str_to_token_type(s: &str) -> Option<TokenType> {
    match s {
        "and" => Some(TokenType::And),
        "class" => Some(TokenType::Class),
        "else" => Some(TokenType::Else),
        "false" => Some(TokenType::False),
        "fun" => Some(TokenType::Fun),
        "for" => Some(TokenType::For),
        "if" => Some(TokenType::If),
        "nil" => Some(TokenType::Nil),
        "or" => Some(TokenType::Or),
        "print" => Some(TokenType::Print),
        "return" => Some(TokenType::Return),
        "super" => Some(TokenType::Super),
        "this" => Some(TokenType::This),
        "true" => Some(TokenType::True),
        "var" => Some(TokenType::Var),
        "while" => Some(TokenType::While),
        _ => None,
    }
}
