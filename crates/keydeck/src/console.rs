use deck_keycode::Chord;

/// One line of headless input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// A key chord to tap, e.g. `ctrl+<numpad8>`.
    Key(Chord),
    /// Pointer click on a slot of the active view.
    Click(usize),
    /// Open a view by index.
    View(usize),
    /// Print the active view's slots.
    Faces,
    /// Write the save file.
    Save,
    /// Leave the loop.
    Quit,
    /// Blank line.
    Empty,
}

/// Parse one input line. Lines starting with `:` are commands; anything
/// else is a chord.
pub fn parse(line: &str) -> Result<Line, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Line::Empty);
    }
    let Some(cmd) = line.strip_prefix(':') else {
        return Chord::parse(line)
            .map(Line::Key)
            .ok_or_else(|| format!("not a key chord: {line}"));
    };
    let mut parts = cmd.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let index = |arg: Option<&str>| -> Result<usize, String> {
        arg.ok_or_else(|| format!(":{name} needs an index"))?
            .parse::<usize>()
            .map_err(|e| format!(":{name}: {e}"))
    };
    match name {
        "click" | "c" => index(parts.next()).map(Line::Click),
        "view" | "v" => index(parts.next()).map(Line::View),
        "faces" | "f" => Ok(Line::Faces),
        "save" | "s" => Ok(Line::Save),
        "quit" | "q" => Ok(Line::Quit),
        other => Err(format!("unknown command :{other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chords_and_commands() {
        assert_eq!(
            parse("ctrl+<numpad8>").unwrap(),
            Line::Key(Chord::parse("<ctrl>+<numpad8>").unwrap())
        );
        assert_eq!(parse(":click 3").unwrap(), Line::Click(3));
        assert_eq!(parse("  :v 0 ").unwrap(), Line::View(0));
        assert_eq!(parse(":q").unwrap(), Line::Quit);
        assert_eq!(parse("").unwrap(), Line::Empty);
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(parse(":click").unwrap_err().contains("needs an index"));
        assert!(parse(":click x").is_err());
        assert!(parse(":launch").unwrap_err().contains("unknown"));
        assert!(parse("hyper+<nope>").is_err());
    }
}
