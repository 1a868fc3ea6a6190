// File: tzbot-core/tests/pipeline_tests.rs

use tempfile::TempDir;
use tzbot_common::models::{ChatMessage, ModerationAction};
use tzbot_core::Error;
use tzbot_core::JsonStore;
use tzbot_core::registries::{CustomCommandRegistry, RestrictionRegistry, WhitelistRegistry};
use tzbot_core::services::builtin_commands::BuiltinCommand;
use tzbot_core::services::{CommandRouter, ModerationPipeline, RegistryView};

const BOT: &str = "1";
const CHANNEL: &str = "100";

struct Fixture {
    _dir: TempDir,
    restrictions: RestrictionRegistry,
    custom: CustomCommandRegistry,
    whitelist: WhitelistRegistry,
    pipeline: ModerationPipeline,
}

impl Fixture {
    fn new() -> Result<Self, Error> {
        let dir = tempfile::tempdir()?;
        let store = JsonStore::new(dir.path());
        Ok(Self {
            restrictions: RestrictionRegistry::load(store.clone())?,
            custom: CustomCommandRegistry::load(store.clone())?,
            whitelist: WhitelistRegistry::load(store)?,
            pipeline: ModerationPipeline::new(CommandRouter::new("!", BuiltinCommand::names())),
            _dir: dir,
        })
    }

    fn eval(&self, author: &str, text: &str) -> ModerationAction {
        self.eval_in(CHANNEL, author, text)
    }

    fn eval_in(&self, channel: &str, author: &str, text: &str) -> ModerationAction {
        let msg = ChatMessage::new("m1", channel, author, text);
        let view = RegistryView {
            restrictions: &self.restrictions,
            custom_commands: &self.custom,
            whitelist: &self.whitelist,
        };
        self.pipeline.evaluate(&msg, Some(BOT), view)
    }
}

fn list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_unrestricted_channel_allows_everything() -> Result<(), Error> {
    let fx = Fixture::new()?;
    for text in ["hello", "", "!unknown", "!buy 5", "   "] {
        assert_eq!(fx.eval("42", text), ModerationAction::Allow, "text {text:?}");
    }
    Ok(())
}

#[test]
fn test_own_messages_are_ignored_before_anything_else() -> Result<(), Error> {
    let mut fx = Fixture::new()?;
    fx.custom.set("!hi", "hello!")?;
    fx.restrictions.restrict(CHANNEL, &list(&["!buy"]))?;

    assert_eq!(fx.eval(BOT, "!hi there"), ModerationAction::Ignore);
    assert_eq!(fx.eval(BOT, "⚠️ Only these are allowed: !buy"), ModerationAction::Ignore);
    assert_eq!(fx.eval(BOT, "!help"), ModerationAction::Ignore);
    Ok(())
}

#[test]
fn test_unknown_bot_identity_ignores_nothing() -> Result<(), Error> {
    let fx = Fixture::new()?;
    let msg = ChatMessage::new("m1", CHANNEL, BOT, "hello");
    let view = RegistryView {
        restrictions: &fx.restrictions,
        custom_commands: &fx.custom,
        whitelist: &fx.whitelist,
    };
    assert_eq!(fx.pipeline.evaluate(&msg, None, view), ModerationAction::Allow);
    Ok(())
}

#[test]
fn test_restriction_uses_plain_prefix_match() -> Result<(), Error> {
    let mut fx = Fixture::new()?;
    fx.restrictions.restrict(CHANNEL, &list(&["!buy", "!shop"]))?;

    for text in ["!buy 5", "!buying", "!buy", "!shop 3"] {
        assert_eq!(fx.eval("42", text), ModerationAction::Allow, "text {text:?}");
    }
    for text in ["hello", "!Buy 5", " !buy", "buy", "!bu"] {
        assert_eq!(
            fx.eval("42", text),
            ModerationAction::DeleteAndWarn(list(&["!buy", "!shop"])),
            "text {text:?}"
        );
    }
    Ok(())
}

#[test]
fn test_restriction_only_applies_to_its_channel() -> Result<(), Error> {
    let mut fx = Fixture::new()?;
    fx.restrictions.restrict(CHANNEL, &list(&["!buy"]))?;
    assert_eq!(fx.eval_in("200", "42", "hello"), ModerationAction::Allow);
    Ok(())
}

#[test]
fn test_whitelisted_author_always_allowed_in_restricted_channel() -> Result<(), Error> {
    let mut fx = Fixture::new()?;
    fx.restrictions.restrict(CHANNEL, &list(&["!buy"]))?;
    fx.whitelist.add("77")?;

    for text in ["hello", "", "anything at all", "!notacommand"] {
        assert_eq!(fx.eval("77", text), ModerationAction::Allow, "text {text:?}");
    }
    assert!(matches!(fx.eval("78", "hello"), ModerationAction::DeleteAndWarn(_)));
    Ok(())
}

#[test]
fn test_whitelisted_author_still_routed_to_commands_and_triggers() -> Result<(), Error> {
    let mut fx = Fixture::new()?;
    fx.whitelist.add("77")?;
    fx.custom.set("!hi", "hello!")?;

    assert_eq!(fx.eval("77", "!hi"), ModerationAction::SendCustomResponse("hello!".into()));
    assert!(matches!(fx.eval("77", "!help"), ModerationAction::InvokeCommand(_)));
    Ok(())
}

#[test]
fn test_custom_trigger_beats_restriction() -> Result<(), Error> {
    let mut fx = Fixture::new()?;
    fx.custom.set("!hi", "hello!")?;
    fx.restrictions.restrict(CHANNEL, &list(&["!buy"]))?;

    assert_eq!(
        fx.eval("42", "!hi there"),
        ModerationAction::SendCustomResponse("hello!".to_string())
    );
    Ok(())
}

#[test]
fn test_custom_trigger_shadows_builtin_command() -> Result<(), Error> {
    let mut fx = Fixture::new()?;
    fx.custom.set("!help", "ask a moderator")?;

    assert_eq!(
        fx.eval("42", "!help"),
        ModerationAction::SendCustomResponse("ask a moderator".to_string())
    );
    Ok(())
}

#[test]
fn test_custom_trigger_is_case_sensitive_prefix_without_boundary() -> Result<(), Error> {
    let mut fx = Fixture::new()?;
    fx.custom.set("hey", "yo")?;

    assert_eq!(fx.eval("42", "heyyy"), ModerationAction::SendCustomResponse("yo".into()));
    assert_eq!(fx.eval("42", "Hey"), ModerationAction::Allow);
    assert_eq!(fx.eval("42", "oh hey"), ModerationAction::Allow);
    Ok(())
}

#[test]
fn test_custom_trigger_selection_is_deterministic() -> Result<(), Error> {
    let mut fx = Fixture::new()?;
    fx.custom.set("!h", "short")?;
    fx.custom.set("!hi", "long")?;

    for _ in 0..5 {
        assert_eq!(fx.eval("42", "!hi"), ModerationAction::SendCustomResponse("long".into()));
    }
    assert_eq!(fx.eval("42", "!ho"), ModerationAction::SendCustomResponse("short".into()));
    Ok(())
}

#[test]
fn test_valid_command_skips_restriction() -> Result<(), Error> {
    let mut fx = Fixture::new()?;
    fx.restrictions.restrict(CHANNEL, &list(&["!buy"]))?;

    match fx.eval("42", "!check_restrictions") {
        ModerationAction::InvokeCommand(inv) => {
            assert_eq!(inv.name, "check_restrictions");
            assert!(inv.args.is_empty());
        }
        other => panic!("expected command, got {other:?}"),
    }
    // Not a known command: restriction applies.
    assert!(matches!(fx.eval("42", "!bogus"), ModerationAction::DeleteAndWarn(_)));
    Ok(())
}

#[test]
fn test_restrict_channel_arguments_keep_quoted_spaces() -> Result<(), Error> {
    let fx = Fixture::new()?;
    match fx.eval("42", r#"!restrict_channel "!buy 5" !shop"#) {
        ModerationAction::InvokeCommand(inv) => {
            assert_eq!(inv.name, "restrict_channel");
            assert_eq!(inv.args, list(&["!buy 5", "!shop"]));
        }
        other => panic!("expected command, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_add_then_remove_prefix_round_trips() -> Result<(), Error> {
    let mut fx = Fixture::new()?;

    // Unrestricted before => unrestricted after.
    fx.restrictions.add_prefix(CHANNEL, "!buy")?;
    fx.restrictions.remove_prefix(CHANNEL, "!buy")?;
    assert!(!fx.restrictions.is_restricted(CHANNEL));
    assert_eq!(fx.eval("42", "hello"), ModerationAction::Allow);

    // Restricted before => same list after.
    fx.restrictions.restrict(CHANNEL, &list(&["!shop"]))?;
    fx.restrictions.add_prefix(CHANNEL, "!buy")?;
    fx.restrictions.remove_prefix(CHANNEL, "!buy")?;
    assert_eq!(fx.restrictions.allowed_prefixes(CHANNEL), Some(&list(&["!shop"])[..]));
    Ok(())
}
