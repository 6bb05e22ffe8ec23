// CLI parsing utilities for todo commands
//
// Arguments mix free title words with `field=value` tokens and `+tag` / `-tag`
// tokens in any order, e.g. `Write draft due=tomorrow urgency=4 +writing`.

use crate::utils::fuzzy::closest_match;

/// Value used for a field token with nothing after `=` (clears the field)
pub const CLEAR_VALUE: &str = "none";

/// Parsed todo arguments from command line
#[derive(Debug, Default, PartialEq)]
pub struct ParsedTodoArgs {
    pub title: Vec<String>,
    pub due: Option<String>,
    pub urgency: Option<String>,
    pub effort: Option<String>,
    pub parent: Option<String>,
    pub tags_add: Vec<String>,
    pub tags_remove: Vec<String>,
}

impl ParsedTodoArgs {
    /// Title words joined with single spaces
    pub fn title_text(&self) -> String {
        self.title.join(" ")
    }
}

/// Field token error
#[derive(Debug, PartialEq)]
pub enum FieldParseError {
    InvalidFieldName {
        field: String,
        suggestion: String,
    },
    ReadOnlyField {
        field: String,
        hint: String,
    },
    InvalidTag {
        message: String,
    },
}

impl std::fmt::Display for FieldParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldParseError::InvalidFieldName { field, suggestion } => {
                write!(f, "Unrecognized field name '{}'\n  Did you mean '{}'?", field, suggestion)
            }
            FieldParseError::ReadOnlyField { field, hint } => {
                write!(f, "Field '{}' cannot be set here.\n  {}", field, hint)
            }
            FieldParseError::InvalidTag { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for FieldParseError {}

/// Valid field names (exact match only)
const FIELD_NAMES: &[&str] = &["due", "urgency", "effort", "parent"];

/// Fields that exist on a todo but are not set through field tokens
const READ_ONLY_FIELDS: &[&str] = &["id", "completed", "created", "modified"];

fn read_only_hint(field: &str) -> &'static str {
    match field {
        "completed" => "Use 'deltatask done <id>' or 'deltatask reopen <id>'.",
        "id" => "Todo IDs are assigned automatically and cannot be changed.",
        _ => "Timestamps are maintained automatically.",
    }
}

/// Parse a field token (field=value)
/// Returns Ok(None) for tokens that are not field tokens
fn parse_field_token(token: &str) -> Result<Option<(String, String)>, FieldParseError> {
    let Some((field, value)) = token.split_once('=') else {
        return Ok(None);
    };
    let field = field.to_lowercase();
    let value = if value.is_empty() { CLEAR_VALUE.to_string() } else { value.to_string() };

    if READ_ONLY_FIELDS.contains(&field.as_str()) {
        return Err(FieldParseError::ReadOnlyField {
            hint: read_only_hint(&field).to_string(),
            field,
        });
    }

    if FIELD_NAMES.contains(&field.as_str()) {
        return Ok(Some((field, value)));
    }

    // Looks like a mistyped field rather than title text with an '=' in it
    if let Some(suggestion) = closest_match(&field, FIELD_NAMES, 2) {
        return Err(FieldParseError::InvalidFieldName {
            field,
            suggestion: suggestion.to_string(),
        });
    }

    Ok(None)
}

/// Parse a tag token (+tag or -tag); the charset is checked again when the tag is stored
/// Returns None for words that are title text
fn parse_tag_token(token: &str) -> Option<Result<(bool, String), FieldParseError>> {
    let add = match token.chars().next() {
        Some('+') => true,
        Some('-') => false,
        _ => return None,
    };
    let name = &token[1..];

    // A dash not followed by a letter or digit is ordinary title text ("Call mom - later")
    if !add && !name.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return None;
    }
    if name.is_empty() {
        return Some(Err(FieldParseError::InvalidTag {
            message: "Tag name cannot be empty. Use '+tagname' to add a tag.".to_string(),
        }));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.') {
        return Some(Err(FieldParseError::InvalidTag {
            message: format!(
                "Invalid tag '{}'. Tags can only contain ASCII letters, numbers, underscores, hyphens, and dots.",
                name
            ),
        }));
    }
    Some(Ok((add, name.to_string())))
}

/// Parse add/modify/split arguments
/// Title is every token that is not a field token or tag token
pub fn parse_todo_args<S: AsRef<str>>(args: &[S]) -> Result<ParsedTodoArgs, FieldParseError> {
    let mut parsed = ParsedTodoArgs::default();

    for arg in args {
        let arg = arg.as_ref();

        if let Some((field, value)) = parse_field_token(arg)? {
            match field.as_str() {
                "due" => parsed.due = Some(value),
                "urgency" => parsed.urgency = Some(value),
                "effort" => parsed.effort = Some(value),
                "parent" => parsed.parent = Some(value),
                _ => unreachable!("field names are checked against FIELD_NAMES"),
            }
            continue;
        }

        match parse_tag_token(arg) {
            Some(Ok((true, name))) => parsed.tags_add.push(name),
            Some(Ok((false, name))) => parsed.tags_remove.push(name),
            Some(Err(e)) => return Err(e),
            None => parsed.title.push(arg.to_string()),
        }
    }

    Ok(parsed)
}
