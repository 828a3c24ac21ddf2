//! The terminal presentation shell: renders the active view and routes
//! line commands into the picker.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use geopick_core::{Coordinates, SavedLocation};
use geopick_session::{PickerDriver, PickerSession, View};
use geopick_store::Storage;

/// Runs the picker loop until the user finalizes a choice (`Some`) or
/// dismisses the widget (`None`).
pub async fn run<S: Storage>(
    mut driver: PickerDriver<S>,
) -> anyhow::Result<Option<SavedLocation>> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    println!("geopick (type \"help\" for commands)");
    loop {
        render(driver.session());
        prompt()?;

        let Some(line) = lines.next_line().await? else {
            return Ok(None); // EOF dismisses the widget
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse(line) {
            Ok(Command::Quit) => return Ok(None),
            Ok(command) => {
                if let Some(chosen) = apply(&mut driver, command).await {
                    return Ok(Some(chosen));
                }
            }
            Err(usage) => println!("! {usage}"),
        }
    }
}

enum Command {
    Select(usize),
    Delete(usize),
    New,
    Find(String),
    Point(Coordinates),
    Search(String),
    Locate,
    Continue,
    Name(String),
    Save,
    Back,
    Help,
    Quit,
}

fn parse(line: &str) -> Result<Command, String> {
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word {
        "select" | "s" => parse_index(rest).map(Command::Select),
        "delete" | "del" => parse_index(rest).map(Command::Delete),
        "new" | "n" => Ok(Command::New),
        "find" | "f" => Ok(Command::Find(rest.to_string())),
        "point" | "p" => parse_point(rest).map(Command::Point),
        "search" => Ok(Command::Search(rest.to_string())),
        "locate" | "here" => Ok(Command::Locate),
        "continue" | "c" => Ok(Command::Continue),
        "name" => Ok(Command::Name(rest.to_string())),
        "save" => Ok(Command::Save),
        "back" | "b" => Ok(Command::Back),
        "help" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command: {other} (try \"help\")")),
    }
}

fn parse_index(raw: &str) -> Result<usize, String> {
    raw.parse()
        .map_err(|_| "expected an entry number".to_string())
}

fn parse_point(raw: &str) -> Result<Coordinates, String> {
    let parts: Vec<&str> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();
    let [lat, lng] = parts.as_slice() else {
        return Err("expected \"point <lat> <lng>\"".to_string());
    };

    let lat: f64 = lat.parse().map_err(|_| format!("bad latitude: {lat}"))?;
    let lng: f64 = lng.parse().map_err(|_| format!("bad longitude: {lng}"))?;
    if !lat.is_finite() || !lng.is_finite() {
        return Err("coordinates must be finite".to_string());
    }
    Ok(Coordinates::new(lat, lng))
}

async fn apply<S: Storage>(
    driver: &mut PickerDriver<S>,
    command: Command,
) -> Option<SavedLocation> {
    match command {
        Command::Select(index) => {
            match entry_at(driver.session(), index) {
                Some(location) => return Some(driver.session_mut().select_saved(&location)),
                None => println!("! no entry number {index}"),
            }
            None
        }
        Command::Delete(index) => {
            match entry_at(driver.session(), index) {
                Some(location) => {
                    driver.session_mut().delete_saved(&location.id);
                    println!("deleted {}", location.name);
                }
                None => println!("! no entry number {index}"),
            }
            None
        }
        Command::New => {
            driver.session_mut().open_map();
            None
        }
        Command::Find(text) => {
            driver.session_mut().set_query(text);
            None
        }
        Command::Point(point) => {
            if driver.session().view() != View::Map {
                println!("! open the map first (\"new\")");
                return None;
            }
            driver.place_marker(point).await;
            None
        }
        Command::Search(text) => {
            if driver.session().view() != View::Map {
                println!("! open the map first (\"new\")");
                return None;
            }
            driver.session_mut().set_query(text);
            match driver.search().await {
                Ok(Some(camera)) => {
                    println!("(panned to {} at zoom {})", camera.center, camera.zoom);
                }
                Ok(None) => {}
                Err(notice) => println!("! {notice}"),
            }
            None
        }
        Command::Locate => {
            if let Err(notice) = driver.locate().await {
                println!("! {notice}");
            }
            None
        }
        Command::Continue => {
            if let Err(notice) = driver.session_mut().confirm() {
                println!("! {notice}");
            }
            None
        }
        Command::Name(text) => {
            driver.session_mut().set_query(text);
            None
        }
        Command::Save => {
            if driver.session().view() != View::Confirm {
                println!("! continue to the confirm step first");
                return None;
            }
            match driver.session_mut().save() {
                Ok(saved) => Some(saved),
                Err(notice) => {
                    println!("! {notice}");
                    None
                }
            }
        }
        Command::Back => {
            driver.session_mut().back();
            None
        }
        Command::Help => {
            print_help(driver.session().view());
            None
        }
        // Already handled by the caller.
        Command::Quit => None,
    }
}

/// Resolves a 1-based entry number against the filtered list.
fn entry_at<S: Storage>(session: &PickerSession<S>, index: usize) -> Option<SavedLocation> {
    let filtered = session.filtered_locations();
    index
        .checked_sub(1)
        .and_then(|slot| filtered.get(slot))
        .map(|location| (*location).clone())
}

fn render<S: Storage>(session: &PickerSession<S>) {
    println!();
    match session.view() {
        View::List => render_list(session),
        View::Map => render_map(session),
        View::Confirm => render_confirm(session),
    }
}

fn render_list<S: Storage>(session: &PickerSession<S>) {
    println!("Saved locations");
    if !session.query().is_empty() {
        println!("  filter: {}", session.query());
    }

    let filtered = session.filtered_locations();
    if filtered.is_empty() {
        println!("  (nothing here)");
        return;
    }
    for (index, location) in filtered.iter().enumerate() {
        let marker = if session.selected().is_some_and(|c| c.id == location.id) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker}{:>3}. {} | {}",
            index + 1,
            location.name,
            location.address
        );
    }
}

fn render_map<S: Storage>(session: &PickerSession<S>) {
    println!("Map (centered at {})", session.map_center());
    match session.draft() {
        Some(draft) => {
            let address = if draft.address.is_empty() {
                "(no address yet)"
            } else {
                draft.address.as_str()
            };
            println!("  marker: {} | {address}", draft.point);
        }
        None => println!("  marker: none yet"),
    }
    if !session.query().is_empty() {
        println!("  search box: {}", session.query());
    }
}

fn render_confirm<S: Storage>(session: &PickerSession<S>) {
    println!("Confirm new location");
    if let Some(draft) = session.draft() {
        println!("  point:   {}", draft.point);
        let address = if draft.address.is_empty() {
            "(no address found)"
        } else {
            draft.address.as_str()
        };
        println!("  address: {address}");
    }

    let name = session.query().trim();
    if name.is_empty() {
        println!("  name:    (use \"name <text>\" before saving)");
    } else {
        println!("  name:    {name}");
    }
}

fn print_help(view: View) {
    match view {
        View::List => {
            println!("find <text>   filter the list");
            println!("select <n>    choose entry n and exit");
            println!("delete <n>    remove entry n");
            println!("new           pick a new location on the map");
            println!("quit          leave without choosing");
        }
        View::Map => {
            println!("point <lat> <lng>   drop the marker");
            println!("search <text>       find an address");
            println!("locate              use the device position");
            println!("continue            go to the confirm step");
            println!("back                return to the list");
            println!("quit                leave without choosing");
        }
        View::Confirm => {
            println!("name <text>   set the name to save under");
            println!("save          save and exit with this location");
            println!("back          return to the map");
            println!("quit          leave without choosing");
        }
    }
}

fn prompt() -> anyhow::Result<()> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}
