//! Shell command parsing and dispatch

use std::path::PathBuf;

use super::AppController;
use crate::model::EntityId;

pub const HELP: &str = "\
Commands:
  login <email> <password>           sign in
  signup <email> <username> <password>
  logout                             sign out
  whoami                             show the current user
  go <path>                          navigate (/, /login, /signup, /home)
  view <dashboard|artist|album|songs>
  list                               reload the current view
  search [query]                     search the current view
  create key=value ... [@audio=file]  add an entry to the current view
  update <id> key=value ... [@audio=file]
  delete <id>
  help | quit";

/// One `key=value` (or `@field=path` upload) argument
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Assignment {
    Field { key: String, value: String },
    Upload { field: String, path: PathBuf },
}

impl Assignment {
    fn parse(arg: &str) -> Result<Self, String> {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("Expected key=value, got `{arg}`"))?;
        match key.strip_prefix('@') {
            Some("") => Err(format!("Missing upload field name in `{arg}`")),
            Some(field) => Ok(Assignment::Upload {
                field: field.to_string(),
                path: PathBuf::from(value),
            }),
            None if key.is_empty() => Err(format!("Missing field name in `{arg}`")),
            None => Ok(Assignment::Field {
                key: key.to_string(),
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Login { email: String, password: String },
    Signup { email: String, username: String, password: String },
    Logout,
    WhoAmI,
    Go(String),
    View(String),
    List,
    Search(String),
    Create(Vec<Assignment>),
    Update(EntityId, Vec<Assignment>),
    Delete(EntityId),
    Help,
    Quit,
    Empty,
}

impl Command {
    /// Parse one line of input. Arguments follow shell quoting rules.
    pub fn parse(line: &str) -> Result<Self, String> {
        let words = shlex::split(line).ok_or_else(|| "Unbalanced quotes".to_string())?;
        let Some((head, args)) = words.split_first() else {
            return Ok(Command::Empty);
        };

        let command = match (head.as_str(), args) {
            ("login", [email, password]) => Command::Login {
                email: email.clone(),
                password: password.clone(),
            },
            ("login", _) => return Err("Usage: login <email> <password>".into()),
            ("signup", [email, username, password]) => Command::Signup {
                email: email.clone(),
                username: username.clone(),
                password: password.clone(),
            },
            ("signup", _) => return Err("Usage: signup <email> <username> <password>".into()),
            ("logout", []) => Command::Logout,
            ("whoami", []) => Command::WhoAmI,
            ("go", [path]) => Command::Go(path.clone()),
            ("view", [tag]) => Command::View(tag.clone()),
            ("view", []) => Command::View(String::new()),
            ("list" | "ls", []) => Command::List,
            ("search", rest) => Command::Search(rest.join(" ")),
            ("create", rest) if !rest.is_empty() => Command::Create(parse_assignments(rest)?),
            ("update", [id, rest @ ..]) if !rest.is_empty() => {
                Command::Update(parse_id(id)?, parse_assignments(rest)?)
            }
            ("update", _) => return Err("Usage: update <id> key=value ...".into()),
            ("delete" | "rm", [id]) => Command::Delete(parse_id(id)?),
            ("help" | "?", _) => Command::Help,
            ("quit" | "exit" | "q", _) => Command::Quit,
            (other, _) => return Err(format!("Unknown command `{other}`. Type `help`.")),
        };
        Ok(command)
    }
}

fn parse_id(raw: &str) -> Result<EntityId, String> {
    raw.parse()
        .map_err(|_| format!("`{raw}` is not a numeric id"))
}

fn parse_assignments(args: &[String]) -> Result<Vec<Assignment>, String> {
    args.iter().map(|arg| Assignment::parse(arg)).collect()
}

impl AppController {
    pub async fn handle_line(&self, line: &str) {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(message) => {
                self.model.set_error(message).await;
                return;
            }
        };
        self.handle_command(command).await;
    }

    pub async fn handle_command(&self, command: Command) {
        // Any new command dismisses the previous error
        self.model.clear_error().await;

        match command {
            Command::Login { email, password } => self.login(&email, &password).await,
            Command::Signup {
                email,
                username,
                password,
            } => self.signup(&email, &username, &password).await,
            Command::Logout => self.logout().await,
            Command::WhoAmI => {
                let session = self.session.session();
                let message = match (session.identity(), session.since()) {
                    (Some(identity), Some(since)) => format!(
                        "Logged in as {} since {}",
                        identity.email,
                        since.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
                    ),
                    _ => "Not logged in".to_string(),
                };
                self.model.set_status(message).await;
            }
            Command::Go(path) => {
                let landed = self.router.navigate(&path);
                if landed == super::Route::Home {
                    self.load_active_view().await;
                }
            }
            Command::View(tag) => self.select_view(&tag).await,
            Command::List => self.load_active_view().await,
            Command::Search(query) => self.perform_search(&query).await,
            Command::Create(assignments) => self.create_entry(&assignments).await,
            Command::Update(id, assignments) => self.update_entry(id, &assignments).await,
            Command::Delete(id) => self.delete_entry(id).await,
            Command::Help => self.model.set_status(HELP.to_string()).await,
            Command::Quit => self.model.set_should_quit(true).await,
            Command::Empty => {}
        }
    }
}
