/// Available commands and autocomplete logic

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "search",
    aliases: &["s", "find", "buscar"],
    description: "Search by code or name",
  },
  Command {
    name: "add",
    aliases: &["a", "new", "registrar"],
    description: "Register a product",
  },
  Command {
    name: "scan",
    aliases: &["camera", "barcode"],
    description: "Read a barcode",
  },
  Command {
    name: "import",
    aliases: &["i", "load", "importar"],
    description: "Replace inventory from a CSV file",
  },
  Command {
    name: "export",
    aliases: &["e", "save", "exportar"],
    description: "Write inventory to CSV",
  },
  Command {
    name: "clear",
    aliases: &["wipe", "limpiar"],
    description: "Delete the whole inventory",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit stockr",
  },
];

/// How well `input` names `cmd`; lower is better, `None` is no match.
///
/// Full names beat aliases at every level, so `ex` lists export before
/// quit (alias `exit`). Spanish aliases such as `buscar` or `importar`
/// resolve as exact matches.
fn rank(cmd: &Command, input: &str) -> Option<u8> {
  let aliases = || cmd.aliases.iter();
  if cmd.name == input {
    Some(0)
  } else if aliases().any(|a| *a == input) {
    Some(1)
  } else if cmd.name.starts_with(input) {
    Some(2)
  } else if aliases().any(|a| a.starts_with(input)) {
    Some(3)
  } else if cmd.name.contains(input) {
    Some(4)
  } else if aliases().any(|a| a.contains(input)) {
    Some(5)
  } else {
    None
  }
}

/// Commands matching the word typed after `:`, best first. Ties keep
/// table order.
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let word = input.trim().to_lowercase();
  if word.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut ranked: Vec<(u8, &'static Command)> = COMMANDS
    .iter()
    .filter_map(|cmd| rank(cmd, &word).map(|r| (r, cmd)))
    .collect();
  ranked.sort_by_key(|(r, _)| *r);
  ranked.into_iter().map(|(_, cmd)| cmd).collect()
}
