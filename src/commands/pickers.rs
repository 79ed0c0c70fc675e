use crate::bot::AppContext;
use crate::handler::{reply_with, FnReply};
use crate::reply::{Button, ButtonAction, Keyboard, Reply};
use crate::router::Call;

pub const OPTIONS: [&str; 4] = ["option 1", "option 2", "option 3", "option 4"];

/// Whole text is one of the numbers offered by `/picknum`
pub const NUMBER_PATTERN: &str = r"^(?:[1-9]|1[0-6])$";

const NUMBER_COUNT: u32 = 16;
const NUMBER_ROW_WIDTH: usize = 4;

pub fn pick() -> Reply {
    let buttons = OPTIONS.iter().map(|o| Button::send(*o)).collect();
    Reply::keyboard(
        "select an option:",
        Keyboard::reply(Keyboard::grid(buttons, 2)).with_placeholder("select an option"),
    )
}

pub fn picknum() -> Reply {
    let buttons = (1..=NUMBER_COUNT)
        .map(|n| Button::send(n.to_string()))
        .collect();
    Reply::keyboard(
        "select a number:",
        Keyboard::reply(Keyboard::grid(buttons, NUMBER_ROW_WIDTH)),
    )
}

pub fn pickrequest() -> Reply {
    let rows = vec![
        vec![
            Button::request("request location", ButtonAction::RequestLocation),
            Button::request("request contact", ButtonAction::RequestContact),
        ],
        vec![Button::request("request poll", ButtonAction::RequestPoll)],
        vec![
            Button::request(
                "request selection for user",
                ButtonAction::RequestUser {
                    request_id: 1,
                    premium: None,
                },
            ),
            Button::request(
                "request selection for premium user",
                ButtonAction::RequestUser {
                    request_id: 2,
                    premium: Some(true),
                },
            ),
        ],
        vec![Button::request(
            "request selection for supergroup with forum",
            ButtonAction::RequestChat {
                request_id: 3,
                is_channel: false,
                is_forum: Some(true),
            },
        )],
    ];
    Reply::keyboard("select a request:", Keyboard::reply(rows))
}

pub fn option_answer() -> FnReply<impl Fn(&AppContext, &Call) -> Reply + Send + Sync> {
    reply_with(|_ctx: &AppContext, call: &Call| {
        Reply::text(format!("you chose the option {}", call.text().unwrap_or_default())).quoted()
    })
}

pub fn number_answer() -> FnReply<impl Fn(&AppContext, &Call) -> Reply + Send + Sync> {
    reply_with(|_ctx: &AppContext, call: &Call| {
        Reply::text(format!("you chose the number {}", call.text().unwrap_or_default())).quoted()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::{KeyboardKind, OutgoingReply};
    use regex::Regex;

    fn keyboard_of(reply: Reply) -> Keyboard {
        match reply.body {
            OutgoingReply::Keyboard { keyboard, .. } => keyboard,
            other => panic!("expected keyboard, got {:?}", other),
        }
    }

    #[test]
    fn test_picknum_has_each_number_once_in_rows_of_four() {
        let keyboard = keyboard_of(picknum());
        assert_eq!(keyboard.rows.len(), 4);
        assert!(keyboard.rows.iter().all(|row| row.len() == 4));
        let labels: Vec<String> = keyboard.buttons().map(|b| b.label.clone()).collect();
        let expected: Vec<String> = (1..=16).map(|n: u32| n.to_string()).collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn test_pick_two_by_two_with_placeholder() {
        let keyboard = keyboard_of(pick());
        assert_eq!(keyboard.rows.len(), 2);
        assert_eq!(keyboard.rows[1][1].label, "option 4");
        assert_eq!(
            keyboard.kind,
            KeyboardKind::Reply {
                resize: true,
                placeholder: Some("select an option".to_string())
            }
        );
    }

    #[test]
    fn test_pickrequest_layout() {
        let keyboard = keyboard_of(pickrequest());
        let widths: Vec<usize> = keyboard.rows.iter().map(Vec::len).collect();
        assert_eq!(widths, vec![2, 1, 2, 1]);
        assert_eq!(keyboard.rows[0][0].action, ButtonAction::RequestLocation);
        assert_eq!(keyboard.rows[0][1].action, ButtonAction::RequestContact);
    }

    #[test]
    fn test_number_pattern_bounds() {
        let re = Regex::new(NUMBER_PATTERN).unwrap();
        for n in 1..=16 {
            assert!(re.is_match(&n.to_string()));
        }
        for bad in ["0", "17", "01", "1 2", "pick 3", ""] {
            assert!(!re.is_match(bad), "{} should not match", bad);
        }
    }
}
