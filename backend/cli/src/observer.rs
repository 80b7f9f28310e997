use weatherwise_core::{Message, Role, SessionError, SessionHandle, SessionObserver};

use crate::terminal_output::{note_error, note_info, render_message};

/// Prints session events to the terminal.
pub struct ConsoleObserver {
    /// Echo user messages too (the chat REPL already shows what was typed).
    pub echo_user: bool,
}

impl SessionObserver for ConsoleObserver {
    fn on_connect(&self, handle: &SessionHandle) {
        note_info(&format!("connected ({handle})"));
    }

    fn on_disconnect(&self) {
        note_info("disconnected");
    }

    fn on_message(&self, message: &Message) {
        if message.role == Role::User && !self.echo_user {
            return;
        }
        print!("{}", render_message(message));
    }

    fn on_error(&self, error: &SessionError) {
        note_error(&error.to_string());
    }
}
