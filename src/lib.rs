/*!
# Calculator Application

A calculator with user accounts and per-user calculation history, built in Rust.

## Overview

Users sign up with a username and password, log in, and work a keypad
calculator. Every completed `=` evaluation is saved to that user's history,
which is shown most recent first and survives restarts.

## Architecture

### Core Layer
- **Calculator Engine** - Pure state machine turning button presses into a
  display value and, on `=`, a finished calculation
- **Session Controller** - Holds the current user and calculator state for one
  interactive session and routes form submissions and presses

### Data Persistence Layer
- User Store - JSON array of `{username, password_hash}` objects
- History Store - Append-only JSON array of `{username, expression, result, timestamp}`
- Missing files are created empty; corrupted files are logged and read as empty,
  and copied to `<file>.corrupt` before the next write replaces them
- Writes go through a temporary file and an atomic rename

### Front End
- Text renderer projecting the session state
- `calculator-cli` binary reading commands and button labels from stdin

## Key Features

- Basic arithmetic with left-to-right operator chaining (`5 + 3 + 2 = 10`)
- Power operator and scientific functions (√, sin, cos, tan, ln, log, x!, x²), π
- Division by zero and other domain errors shown as `Error`, never fatal
- Argon2id password hashing
- Signup returns to the login view instead of logging in

## Modules

- **calculator**: Calculator Engine (inputs, operators, state transitions)
- **session**: Session Controller (login, signup, logout, button presses)
- **login**: Users, password hashing and the user store
- **history**: History records and the history store
- **saving**: JSON file persistence helpers
- **config**: Storage locations
- **render**: Terminal projection of a session
- **error**: Error taxonomy
*/

pub mod calculator;
pub mod config;
pub mod error;
pub mod history;
pub mod login;
pub mod render;
pub mod saving;
pub mod session;

/// Re-export everything from these modules to make it easier to use
pub use calculator::*;
pub use config::*;
pub use error::*;
pub use history::*;
pub use login::*;
pub use session::*;
