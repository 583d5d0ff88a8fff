//! Command-line argument parsing.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use schoolrec_core::models::Resource;

pub const USAGE: &str = "\
Usage: schoolrec <command> [args]

Commands:
  login [username]                              Log in and remember the session
  logout                                        Forget the session and stored password
  list <resource> [--page N] [--search TERM]    List one page of records
  add <resource> <body.json>                    Create a record from a JSON object
  edit <resource> <id> <body.json>              Update a record from a JSON object
  delete <resource> <id>                        Delete a record
  schedule <class_id> <level_id> <rows.json>    Stage and save a class timetable
  enroll <student_id> <class_id> <slot_id>... [--remarks TEXT]
                                                Enroll a student in class-subject slots
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login {
        username: Option<String>,
    },
    Logout,
    List {
        resource: Resource,
        page: u32,
        search: String,
    },
    Add {
        resource: Resource,
        body_file: PathBuf,
    },
    Edit {
        resource: Resource,
        id: String,
        body_file: PathBuf,
    },
    Delete {
        resource: Resource,
        id: String,
    },
    Schedule {
        class_id: String,
        level_id: String,
        rows_file: PathBuf,
    },
    Enroll {
        student_id: String,
        class_id: String,
        slot_ids: Vec<String>,
        remarks: Option<String>,
    },
    Help,
}

impl Command {
    /// Parse arguments, excluding the program name.
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Command::Help);
        };

        match name.as_str() {
            "login" => {
                let (positional, _) = split_flags(rest, &[])?;
                Ok(Command::Login {
                    username: positional.first().cloned(),
                })
            }
            "logout" => Ok(Command::Logout),
            "list" => {
                let (positional, flags) = split_flags(rest, &["--page", "--search"])?;
                let resource = parse_resource(positional.first())?;
                let page = match flag(&flags, "--page") {
                    Some(value) => value
                        .parse()
                        .with_context(|| format!("Invalid page number '{}'", value))?,
                    None => 1,
                };
                Ok(Command::List {
                    resource,
                    page,
                    search: flag(&flags, "--search").unwrap_or_default().to_string(),
                })
            }
            "add" => {
                let (positional, _) = split_flags(rest, &[])?;
                match positional.as_slice() {
                    [resource, body_file] => Ok(Command::Add {
                        resource: parse_resource(Some(resource))?,
                        body_file: PathBuf::from(body_file),
                    }),
                    _ => bail!("Expected: add <resource> <body.json>"),
                }
            }
            "edit" => {
                let (positional, _) = split_flags(rest, &[])?;
                match positional.as_slice() {
                    [resource, id, body_file] => Ok(Command::Edit {
                        resource: parse_resource(Some(resource))?,
                        id: id.clone(),
                        body_file: PathBuf::from(body_file),
                    }),
                    _ => bail!("Expected: edit <resource> <id> <body.json>"),
                }
            }
            "delete" => {
                let (positional, _) = split_flags(rest, &[])?;
                let resource = parse_resource(positional.first())?;
                let id = positional.get(1).ok_or_else(|| anyhow!("Missing record id"))?;
                Ok(Command::Delete {
                    resource,
                    id: id.clone(),
                })
            }
            "schedule" => {
                let (positional, _) = split_flags(rest, &[])?;
                match positional.as_slice() {
                    [class_id, level_id, rows_file] => Ok(Command::Schedule {
                        class_id: class_id.clone(),
                        level_id: level_id.clone(),
                        rows_file: PathBuf::from(rows_file),
                    }),
                    _ => bail!("Expected: schedule <class_id> <level_id> <rows.json>"),
                }
            }
            "enroll" => {
                let (positional, flags) = split_flags(rest, &["--remarks"])?;
                match positional.as_slice() {
                    [student_id, class_id, slot_ids @ ..] => Ok(Command::Enroll {
                        student_id: student_id.clone(),
                        class_id: class_id.clone(),
                        slot_ids: slot_ids.to_vec(),
                        remarks: flag(&flags, "--remarks").map(str::to_string),
                    }),
                    _ => bail!("Expected: enroll <student_id> <class_id> <slot_id>..."),
                }
            }
            "help" | "--help" | "-h" => Ok(Command::Help),
            other => bail!("Unknown command '{}'", other),
        }
    }
}

fn parse_resource(arg: Option<&String>) -> Result<Resource> {
    let arg = arg.ok_or_else(|| anyhow!("Missing resource name"))?;
    arg.parse().map_err(|e: String| anyhow!(e))
}

/// Split `--flag value` pairs from positional arguments.
fn split_flags(args: &[String], known: &[&str]) -> Result<(Vec<String>, Vec<(String, String)>)> {
    let mut positional = Vec::new();
    let mut flags = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            if !known.contains(&arg.as_str()) {
                bail!("Unknown option '{}'", arg);
            }
            let value = iter
                .next()
                .ok_or_else(|| anyhow!("Option '{}' needs a value", arg))?;
            flags.push((arg.clone(), value.clone()));
        } else {
            positional.push(arg.clone());
        }
    }
    Ok((positional, flags))
}

fn flag<'a>(flags: &'a [(String, String)], name: &str) -> Option<&'a str> {
    flags
        .iter()
        .rev()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_no_args_is_help() {
        assert_eq!(Command::parse(&[]).unwrap(), Command::Help);
    }

    #[test]
    fn test_parse_list_with_flags() {
        let cmd = Command::parse(&args("list students --search cruz --page 3")).unwrap();
        assert_eq!(
            cmd,
            Command::List {
                resource: Resource::Students,
                page: 3,
                search: "cruz".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_list_defaults() {
        let cmd = Command::parse(&args("list school-room")).unwrap();
        assert_eq!(
            cmd,
            Command::List {
                resource: Resource::SchoolRoom,
                page: 1,
                search: String::new(),
            }
        );
    }

    #[test]
    fn test_parse_list_rejects_bad_input() {
        assert!(Command::parse(&args("list")).is_err());
        assert!(Command::parse(&args("list teachers")).is_err());
        assert!(Command::parse(&args("list students --page x")).is_err());
        assert!(Command::parse(&args("list students --sort name")).is_err());
        assert!(Command::parse(&args("list students --page")).is_err());
    }

    #[test]
    fn test_parse_enroll() {
        let mut argv = args("enroll s1 c1 cs1 cs2 --remarks");
        argv.push("late enrollee".to_string());
        let cmd = Command::parse(&argv).unwrap();
        assert_eq!(
            cmd,
            Command::Enroll {
                student_id: "s1".to_string(),
                class_id: "c1".to_string(),
                slot_ids: vec!["cs1".to_string(), "cs2".to_string()],
                remarks: Some("late enrollee".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_schedule_needs_three_args() {
        assert!(Command::parse(&args("schedule c1 l1")).is_err());
        let cmd = Command::parse(&args("schedule c1 l1 rows.json")).unwrap();
        assert!(matches!(cmd, Command::Schedule { ref rows_file, .. } if rows_file == &PathBuf::from("rows.json")));
    }

    #[test]
    fn test_parse_add_and_edit() {
        assert_eq!(
            Command::parse(&args("add school-room room.json")).unwrap(),
            Command::Add {
                resource: Resource::SchoolRoom,
                body_file: PathBuf::from("room.json"),
            }
        );
        assert_eq!(
            Command::parse(&args("edit students s1 student.json")).unwrap(),
            Command::Edit {
                resource: Resource::Students,
                id: "s1".to_string(),
                body_file: PathBuf::from("student.json"),
            }
        );
        assert!(Command::parse(&args("add school-room")).is_err());
        assert!(Command::parse(&args("edit students student.json")).is_err());
        assert!(Command::parse(&args("add classrooms room.json")).is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert!(Command::parse(&args("frobnicate")).is_err());
    }
}
