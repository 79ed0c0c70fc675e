use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use tracing::warn;

use crate::bot::AppContext;
use crate::handler::{reply_with, FnReply};
use crate::reply::{Button, Keyboard, Reply};
use crate::router::Call;

pub const USAGE: &str = "usage: /random <min> <max>";

/// Callback payload written by the `/random` button
pub const PAYLOAD_PATTERN: &str = r"^\d+,\d+$";

/// `/random <min> <max>`: offer a button whose payload carries the bounds.
pub fn prompt() -> FnReply<impl Fn(&AppContext, &Call) -> Reply + Send + Sync> {
    reply_with(|_ctx: &AppContext, call: &Call| {
        let (Some(min), Some(max)) = (
            call.args.get(0).and_then(parse_bound),
            call.args.get(1).and_then(parse_bound),
        ) else {
            return Reply::text(USAGE);
        };
        Reply::keyboard(
            format!(
                "press the button to get a random number between {} and {}",
                min, max
            ),
            Keyboard::inline(vec![vec![Button::callback(
                "generate",
                format!("{},{}", min, max),
            )]]),
        )
    })
}

/// Plain decimal digits that fit a u64, so the button payload stays rollable.
fn parse_bound(token: &str) -> Option<u64> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Uniform integer in the inclusive range encoded as `"<min>,<max>"`.
/// Reversed bounds are swapped; None when either bound does not fit a u64.
pub fn roll<R: Rng>(rng: &mut R, payload: &str) -> Option<u64> {
    let (min, max) = payload.split_once(',')?;
    let min: u64 = min.trim().parse().ok()?;
    let max: u64 = max.trim().parse().ok()?;
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    Some(rng.gen_range(low..=high))
}

/// Answers a `"<min>,<max>"` button press.
pub fn answer() -> FnReply<impl Fn(&AppContext, &Call) -> Reply + Send + Sync> {
    reply_with(|_ctx: &AppContext, call: &Call| {
        let payload = call.payload().unwrap_or_default();
        match roll(&mut rand::thread_rng(), payload) {
            Some(n) => Reply::text(n.to_string()),
            None => {
                warn!("Unusable random payload: {:?}", payload);
                Reply::failure()
            }
        }
    })
}

/// One byte from the operating system's entropy source.
pub fn secure_byte() -> Result<u8, rand::Error> {
    let mut byte = [0u8; 1];
    OsRng.try_fill_bytes(&mut byte)?;
    Ok(byte[0])
}

/// `/srandom`
pub fn secure() -> FnReply<impl Fn(&AppContext, &Call) -> Reply + Send + Sync> {
    reply_with(|_ctx: &AppContext, _call: &Call| match secure_byte() {
        Ok(n) => Reply::text(n.to_string()).quoted(),
        Err(e) => {
            warn!("OS entropy source failed: {}", e);
            Reply::failure()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use crate::handler::Handler;
    use crate::reply::{ButtonAction, OutgoingReply};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[tokio::test]
    async fn test_prompt_encodes_literal_pair() {
        let ctx = testing::context("http://127.0.0.1:9");
        let reply = prompt().handle(&ctx, &testing::call("/random", "5 7")).await;
        let OutgoingReply::Keyboard { text, keyboard } = reply.body else {
            panic!("expected keyboard");
        };
        assert_eq!(
            text,
            "press the button to get a random number between 5 and 7"
        );
        assert_eq!(
            keyboard.rows,
            vec![vec![Button {
                label: "generate".to_string(),
                action: ButtonAction::Callback("5,7".to_string()),
            }]]
        );
    }

    #[tokio::test]
    async fn test_prompt_rejects_non_numbers() {
        let ctx = testing::context("http://127.0.0.1:9");
        for args in [
            "a b",
            "-1 5",
            "1.5 2",
            "+1 5",
            "1 99999999999999999999999999999999",
        ] {
            let reply = prompt().handle(&ctx, &testing::call("/random", args)).await;
            assert_eq!(reply, Reply::text(USAGE), "args {:?}", args);
        }
    }

    #[tokio::test]
    async fn test_prompt_payload_rolls_at_u64_max() {
        let ctx = testing::context("http://127.0.0.1:9");
        let reply = prompt()
            .handle(&ctx, &testing::call("/random", "0 18446744073709551615"))
            .await;
        let OutgoingReply::Keyboard { keyboard, .. } = reply.body else {
            panic!("expected keyboard");
        };
        let ButtonAction::Callback(payload) = &keyboard.rows[0][0].action else {
            panic!("expected callback button");
        };
        assert!(payload.len() <= 64);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(roll(&mut rng, payload).is_some());
    }

    #[test]
    fn test_roll_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let n = roll(&mut rng, "3,9").unwrap();
            assert!((3..=9).contains(&n));
        }
    }

    #[test]
    fn test_roll_degenerate_and_reversed() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(roll(&mut rng, "42,42"), Some(42));
        let n = roll(&mut rng, "10,1").unwrap();
        assert!((1..=10).contains(&n));
    }

    #[test]
    fn test_roll_rejects_overflow() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(roll(&mut rng, "1,99999999999999999999999"), None);
        assert_eq!(roll(&mut rng, "nope"), None);
    }

    #[tokio::test]
    async fn test_answer_overflow_is_generic_failure() {
        let ctx = testing::context("http://127.0.0.1:9");
        let call = crate::router::Call {
            route: "random-answer",
            event: testing::callback("1,99999999999999999999999"),
            args: Default::default(),
        };
        assert_eq!(answer().handle(&ctx, &call).await, Reply::failure());
    }

    #[tokio::test]
    async fn test_secure_reply_is_a_byte() {
        let ctx = testing::context("http://127.0.0.1:9");
        for _ in 0..20 {
            let reply = secure().handle(&ctx, &testing::call("/srandom", "")).await;
            assert!(reply.quote);
            let n: u16 = reply.as_text().unwrap().parse().unwrap();
            assert!(n <= 255);
        }
    }
}
