#![cfg(not(tarpaulin_include))]

use lazy_static::lazy_static;
use regex::Regex;
use rusty_calculator::calculator::Input;
use rusty_calculator::config::StorageConfig;
use rusty_calculator::render;
use rusty_calculator::session::SessionController;
use std::io::{self, Write};

lazy_static! {
    static ref SIGNUP_REGEX: Regex = Regex::new(r"^signup\s+(\S+)\s+(\S+)\s+(\S+)$").unwrap();
    static ref LOGIN_REGEX: Regex = Regex::new(r"^login\s+(\S+)\s+(\S+)$").unwrap();
    static ref VIEW_REGEX: Regex = Regex::new(r"^view\s+(login|signup)$").unwrap();
}

fn print_help() {
    println!("Commands:");
    println!("  q: Quit");
    println!("  signup <username> <password> <confirm>: Create an account");
    println!("  login <username> <password>: Log in");
    println!("  logout: Log out");
    println!("  view login|signup: Switch form");
    println!("  history: Show your calculation history");
    println!("  <buttons>: Press buttons, separated by spaces");
    println!("    0-9 .  + - * / ^  =  c  sqrt sin cos tan ln log ! sq pi");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = StorageConfig::from_env();
    let mut session = SessionController::open(&config);
    let mut show = true;

    loop {
        if show {
            print!("{}", render::render(session.state()));
        }
        show = true;

        let user = session.current_user().unwrap_or("guest").to_string();
        print!("({}) > ", user);
        io::stdout().flush()?;

        let mut command = String::new();
        if io::stdin().read_line(&mut command)? == 0 {
            break;
        }
        let command = command.trim();

        if command.is_empty() {
            show = false;
            continue;
        }

        if command == "q" {
            break;
        } else if command == "help" {
            print_help();
            show = false;
        } else if command == "logout" {
            session.logout();
        } else if command == "history" {
            session.refresh_history();
            print!("{}", render::render_history(&session.state().history));
            show = false;
        } else if let Some(caps) = VIEW_REGEX.captures(command) {
            match &caps[1] {
                "signup" => session.show_signup(),
                _ => session.show_login(),
            }
        } else if let Some(caps) = SIGNUP_REGEX.captures(command) {
            // Failures are already recorded as the session notice
            let _ = session.submit_signup(&caps[1], &caps[2], &caps[3]);
        } else if let Some(caps) = LOGIN_REGEX.captures(command) {
            let _ = session.submit_login(&caps[1], &caps[2]);
        } else {
            let inputs: Option<Vec<Input>> = command.split_whitespace().map(Input::parse).collect();
            match inputs {
                Some(inputs) => {
                    for input in inputs {
                        // Stop at the first press that raised a notice
                        if !matches!(session.press_button(input), Ok(None)) {
                            break;
                        }
                    }
                }
                None => {
                    println!("invalid command (type help)");
                    show = false;
                }
            }
        }
    }

    Ok(())
}
