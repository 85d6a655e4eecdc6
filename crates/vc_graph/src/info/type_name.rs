//! Parsing of serialized type names.
//!
//! Closed generic types may appear in three spellings:
//!
//! - canonical: `game::Pair<i32, alloc::string::String>`
//! - qualified-bracketed: ``game::Pair`2[[i32, core],[alloc::string::String, alloc]]``
//! - debug-bracketed: ``game::Pair`2[i32,alloc::string::String]``
//!
//! A trailing `, qualifier` (the name of the module or library that defined
//! the type) may follow any of them and is ignored.

use alloc::vec::Vec;

// -----------------------------------------------------------------------------
// GenericName

/// A generic type name split into its definition and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericName<'a> {
    /// Path of the generic definition, without arguments or arity marker.
    pub definition: &'a str,
    /// Argument names, each possibly generic itself.
    pub args: Vec<&'a str>,
}

/// Splits a closed generic name into definition and arguments.
///
/// Returns `None` for non-generic names and for malformed lists, including
/// an arity marker that disagrees with the number of arguments.
///
/// ```
/// use vc_graph::info::parse_generic;
///
/// let name = parse_generic("game::Pair`2[[i32, core],[u8, core]]").unwrap();
/// assert_eq!(name.definition, "game::Pair");
/// assert_eq!(name.args, ["i32", "u8"]);
///
/// let name = parse_generic("game::Pair<i32, game::Box<u8>>").unwrap();
/// assert_eq!(name.args, ["i32", "game::Box<u8>"]);
/// ```
pub fn parse_generic(name: &str) -> Option<GenericName<'_>> {
    let name = strip_qualifier(name);
    let open = name.find('<');

    if let Some(tick) = name.find('`')
        && open.is_none_or(|open| tick < open)
    {
        let definition = name[..tick].trim();
        let rest = &name[tick + 1..];
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let arity: usize = rest[..digits].parse().ok()?;
        let inner = rest[digits..]
            .trim()
            .strip_prefix('[')?
            .strip_suffix(']')?;

        let mut args = Vec::with_capacity(arity);
        for item in split_top_level(inner) {
            let item = item.trim();
            let arg = match item.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                Some(qualified) => strip_qualifier(qualified),
                None => item,
            };
            if arg.is_empty() {
                return None;
            }
            args.push(arg);
        }

        if definition.is_empty() || args.len() != arity {
            return None;
        }
        return Some(GenericName { definition, args });
    }

    let open = open?;
    let definition = name[..open].trim();
    let inner = name[open + 1..].strip_suffix('>')?;

    let args: Vec<&str> = split_top_level(inner).into_iter().map(str::trim).collect();
    if definition.is_empty() || args.iter().any(|a| a.is_empty()) {
        return None;
    }
    Some(GenericName { definition, args })
}

/// Strips the qualifier, module path, generic arguments and arity marker.
///
/// ```
/// use vc_graph::info::strip_namespace;
///
/// assert_eq!(strip_namespace("game::actors::Player, game"), "Player");
/// assert_eq!(strip_namespace("game::Pair`2[[i32, core],[u8, core]]"), "Pair");
/// assert_eq!(strip_namespace("Game.Actors.Player"), "Player");
/// ```
pub fn strip_namespace(name: &str) -> &str {
    let name = strip_qualifier(name);
    let end = name.find(['<', '[', '`']).unwrap_or(name.len());
    let head = name[..end].trim();
    match head.rfind("::") {
        Some(index) => &head[index + 2..],
        None => head.rsplit('.').next().unwrap_or(head),
    }
}

/// Removes a trailing top-level `, qualifier`.
fn strip_qualifier(name: &str) -> &str {
    let name = name.trim();
    split_top_level(name).first().map_or(name, |head| head.trim())
}

/// Splits at commas that are not nested inside brackets.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0_i32;
    let mut start = 0;
    for (index, c) in s.char_indices() {
        match c {
            '<' | '[' | '(' => depth += 1,
            '>' | ']' | ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&s[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{parse_generic, strip_namespace};

    #[test]
    fn nested_qualified_arguments() {
        let name = parse_generic(
            "game::Pair`2[[game::Slot`1[[i32, core]], game],[alloc::string::String, alloc]], game",
        )
        .unwrap();
        assert_eq!(name.definition, "game::Pair");
        assert_eq!(name.args, ["game::Slot`1[[i32, core]]", "alloc::string::String"]);

        let inner = parse_generic(name.args[0]).unwrap();
        assert_eq!(inner.definition, "game::Slot");
        assert_eq!(inner.args, ["i32"]);
    }

    #[test]
    fn debug_bracketed_arguments() {
        let name = parse_generic("game::Pair`2[i32,game::Slot<u8>]").unwrap();
        assert_eq!(name.args, ["i32", "game::Slot<u8>"]);
    }

    #[test]
    fn rejects_bad_lists() {
        assert_eq!(parse_generic("game::Player"), None);
        assert_eq!(parse_generic("game::Pair`2[i32]"), None);
        assert_eq!(parse_generic("game::Pair<i32,>"), None);
        assert_eq!(parse_generic("game::Pair`x[i32]"), None);
    }

    #[test]
    fn namespace_stripping() {
        assert_eq!(strip_namespace("Player"), "Player");
        assert_eq!(strip_namespace("alloc::vec::Vec<i32>"), "Vec");
        assert_eq!(strip_namespace(" game::Player , game "), "Player");
    }
}
