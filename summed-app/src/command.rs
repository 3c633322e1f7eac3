use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use summed_client::{AccordionSection, NavItem, ResourceMenu};

pub const HELP: &str = "\
Commands:
  upload <path>            upload a paper (same as dropping it)
  docs                     list uploaded papers
  select <n>               show paper n (1-based) and refetch its summary
  section <name>           toggle an accordion section (summary, key concepts, ...)
  menu <tables|figures>    show the tables or figures menu
  show                     print the results panel
  image <name> [dir]       download an extracted table/figure
  chat <text>              ask the assistant
  transcript               print the chat transcript
  canvas load <path>       put an image on the canvas
  canvas text <text>       set the annotation text
  canvas draw              draw the annotation text onto the canvas
  canvas save <path>       write the canvas as PNG
  canvas info              print canvas size and overlays
  nav <item>               activate a nav item (Home, Presentations, About Us, Login, Sign up)
  nav menu                 toggle the mobile menu
  status                   upload/summary flags
  help                     this text
  quit                     leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasCommand {
    Load(PathBuf),
    Text(String),
    Draw,
    Save(PathBuf),
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload(PathBuf),
    Docs,
    /// Zero-based index
    Select(usize),
    Section(AccordionSection),
    /// Raw menu slot
    Menu(usize),
    Show,
    Image { name: String, dir: Option<PathBuf> },
    Chat(String),
    Transcript,
    Canvas(CanvasCommand),
    Nav(NavItem),
    NavMenu,
    Status,
    Help,
    Quit,
    Empty,
}

pub fn parse(line: &str) -> Result<Command> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "" => Command::Empty,
        "upload" | "drop" => Command::Upload(PathBuf::from(required(rest, "upload <path>")?)),
        "docs" | "documents" => Command::Docs,
        "select" => {
            let n: usize = required(rest, "select <n>")?
                .parse()
                .map_err(|_| anyhow!("select expects a number, got '{}'", rest))?;
            if n == 0 {
                bail!("papers are numbered from 1");
            }
            Command::Select(n - 1)
        }
        "section" => Command::Section(required(rest, "section <name>")?.parse()?),
        "menu" => Command::Menu(parse_menu(required(rest, "menu <tables|figures>")?)?),
        "show" => Command::Show,
        "image" => {
            let mut parts = required(rest, "image <name> [dir]")?.split_whitespace();
            let name = parts.next().unwrap_or_default().to_string();
            let dir = parts.next().map(PathBuf::from);
            Command::Image { name, dir }
        }
        "chat" | "say" => Command::Chat(rest.to_string()),
        "transcript" => Command::Transcript,
        "canvas" => Command::Canvas(parse_canvas(rest)?),
        "nav" if rest.eq_ignore_ascii_case("menu") => Command::NavMenu,
        "nav" => Command::Nav(required(rest, "nav <item>")?.parse()?),
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command '{}', try 'help'", other),
    };
    Ok(command)
}

fn required<'a>(rest: &'a str, usage: &str) -> Result<&'a str> {
    if rest.is_empty() {
        bail!("usage: {}", usage);
    }
    Ok(rest)
}

fn parse_menu(arg: &str) -> Result<usize> {
    if let Ok(slot) = arg.parse::<usize>() {
        return Ok(slot);
    }
    Ok(arg.parse::<ResourceMenu>()?.slot())
}

fn parse_canvas(rest: &str) -> Result<CanvasCommand> {
    let (action, arg) = match rest.split_once(char::is_whitespace) {
        Some((action, arg)) => (action, arg.trim()),
        None => (rest, ""),
    };

    let command = match action {
        "load" => CanvasCommand::Load(PathBuf::from(required(arg, "canvas load <path>")?)),
        // the buffer may legitimately be blank
        "text" => CanvasCommand::Text(arg.to_string()),
        "draw" => CanvasCommand::Draw,
        "save" => CanvasCommand::Save(PathBuf::from(required(arg, "canvas save <path>")?)),
        "info" | "" => CanvasCommand::Info,
        other => bail!("unknown canvas action '{}'", other),
    };
    Ok(command)
}
