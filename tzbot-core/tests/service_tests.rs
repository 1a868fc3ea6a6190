// File: tzbot-core/tests/service_tests.rs

use tzbot_common::models::{MessageRef, ModerationAction};
use tzbot_core::Error;
use tzbot_core::test_utils::helpers::{GatewayCall, TEST_BOT_ID, TestBot, admin_message, message};

const CHANNEL: &str = "100";
const USER: &str = "42";

#[tokio::test]
async fn test_disallowed_message_is_deleted_warned_and_warning_cleaned_up() -> Result<(), Error> {
    let bot = TestBot::new().await?;
    bot.service
        .handle_message(&admin_message(CHANNEL, "!restrict_channel !buy"))
        .await;
    let before = bot.gateway.calls().await.len();

    let msg = message(CHANNEL, USER, "hello");
    let outcome = bot.service.handle_message(&msg).await;
    assert_eq!(outcome.action, ModerationAction::DeleteAndWarn(vec!["!buy".to_string()]));
    assert_eq!(outcome.report.deleted, vec![msg.message_ref()]);
    assert_eq!(outcome.report.sent.len(), 1);
    let warning = outcome.report.sent[0].clone();

    let cleanup = outcome.report.warning_cleanup.expect("warning cleanup scheduled");
    cleanup.await.expect("cleanup task panicked");

    let calls = bot.gateway.calls().await;
    assert_eq!(
        &calls[before..],
        &[
            GatewayCall::Delete(msg.message_ref()),
            GatewayCall::Send {
                channel_id: CHANNEL.to_string(),
                text: "⚠️ Only these are allowed: !buy".to_string(),
                sent: warning.clone(),
            },
            GatewayCall::Delete(warning),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_allowed_message_touches_nothing() -> Result<(), Error> {
    let bot = TestBot::new().await?;
    bot.service
        .handle_message(&admin_message(CHANNEL, r#"!restrict_channel "!buy 5" !shop"#))
        .await;
    let before = bot.gateway.calls().await.len();

    for text in ["!buy 5 apples", "!shop"] {
        let outcome = bot.service.handle_message(&message(CHANNEL, USER, text)).await;
        assert_eq!(outcome.action, ModerationAction::Allow);
    }
    let outcome = bot.service.handle_message(&message(CHANNEL, USER, "!buy 6")).await;
    assert!(matches!(outcome.action, ModerationAction::DeleteAndWarn(_)));
    if let Some(cleanup) = outcome.report.warning_cleanup {
        cleanup.await.expect("cleanup task panicked");
    }

    assert_eq!(bot.gateway.calls().await.len(), before + 3);
    Ok(())
}

#[tokio::test]
async fn test_own_messages_produce_no_calls() -> Result<(), Error> {
    let bot = TestBot::new().await?;
    bot.service
        .handle_message(&admin_message(CHANNEL, "!restrict_channel !buy"))
        .await;
    let before = bot.gateway.calls().await.len();

    let outcome = bot
        .service
        .handle_message(&message(CHANNEL, TEST_BOT_ID, "⚠️ Only these are allowed: !buy"))
        .await;
    assert_eq!(outcome.action, ModerationAction::Ignore);
    assert_eq!(bot.gateway.calls().await.len(), before);
    Ok(())
}

#[tokio::test]
async fn test_restrict_channel_reply_lists_prefixes() -> Result<(), Error> {
    let bot = TestBot::new().await?;
    let outcome = bot
        .service
        .handle_message(&admin_message(CHANNEL, r#"!restrict_channel "!buy 5" !shop"#))
        .await;
    assert!(matches!(outcome.action, ModerationAction::InvokeCommand(_)));
    assert_eq!(
        bot.gateway.sent_texts().await,
        vec!["Channel restricted. Only these commands are allowed: !buy 5, !shop".to_string()]
    );

    let restrictions = bot.service.state().restrictions.read().await;
    assert_eq!(
        restrictions.allowed_prefixes(CHANNEL),
        Some(&["!buy 5".to_string(), "!shop".to_string()][..])
    );
    Ok(())
}

#[tokio::test]
async fn test_non_admin_cannot_mutate() -> Result<(), Error> {
    let bot = TestBot::new().await?;
    bot.service
        .handle_message(&message(CHANNEL, USER, "!restrict_channel !buy"))
        .await;

    assert_eq!(
        bot.gateway.sent_texts().await,
        vec!["You need administrator permission to use `!restrict_channel`.".to_string()]
    );
    assert!(!bot.service.state().restrictions.read().await.is_restricted(CHANNEL));
    Ok(())
}

#[tokio::test]
async fn test_platform_admin_flag_grants_access() -> Result<(), Error> {
    let bot = TestBot::new().await?;
    let msg = message(CHANNEL, "77", "!whitelist_add <@!42>").with_admin(true);
    bot.service.handle_message(&msg).await;

    assert_eq!(
        bot.gateway.sent_texts().await,
        vec!["User <@42> added to the whitelist.".to_string()]
    );
    assert!(bot.service.state().whitelist.read().await.contains("42"));
    Ok(())
}

#[tokio::test]
async fn test_public_commands_need_no_admin() -> Result<(), Error> {
    let bot = TestBot::new().await?;
    bot.service.handle_message(&message(CHANNEL, USER, "!list_commands")).await;

    assert_eq!(
        bot.gateway.sent_texts().await,
        vec!["No custom commands available.".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn test_check_restrictions_is_admin_only() -> Result<(), Error> {
    let bot = TestBot::new().await?;
    bot.service
        .handle_message(&admin_message(CHANNEL, "!restrict_channel !buy"))
        .await;
    bot.service
        .handle_message(&message(CHANNEL, USER, "!check_restrictions"))
        .await;
    bot.service
        .handle_message(&admin_message(CHANNEL, "!check_restrictions"))
        .await;

    let sent = bot.gateway.sent_texts().await;
    assert_eq!(
        &sent[1..],
        &[
            "You need administrator permission to use `!check_restrictions`.".to_string(),
            "This channel is restricted. Allowed: !buy".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_custom_command_lifecycle() -> Result<(), Error> {
    let bot = TestBot::new().await?;
    bot.service
        .handle_message(&admin_message(CHANNEL, "!add_command !hi Hello there, friend!"))
        .await;

    let outcome = bot.service.handle_message(&message(CHANNEL, USER, "!hi")).await;
    assert_eq!(
        outcome.action,
        ModerationAction::SendCustomResponse("Hello there, friend!".to_string())
    );

    bot.service
        .handle_message(&admin_message(CHANNEL, "!remove_command !hi"))
        .await;
    let outcome = bot.service.handle_message(&message(CHANNEL, USER, "!hi")).await;
    assert_eq!(outcome.action, ModerationAction::Allow);

    assert_eq!(
        bot.gateway.sent_texts().await,
        vec![
            "Custom command '!hi' added.".to_string(),
            "Hello there, friend!".to_string(),
            "Custom command '!hi' removed.".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_custom_response_is_trimmed() -> Result<(), Error> {
    let bot = TestBot::new().await?;
    bot.service
        .handle_message(&admin_message(CHANNEL, "!add_command !gm   good  morning   "))
        .await;

    let outcome = bot.service.handle_message(&message(CHANNEL, USER, "!gm")).await;
    assert_eq!(
        outcome.action,
        ModerationAction::SendCustomResponse("good  morning".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_state_survives_restart() -> Result<(), Error> {
    let bot = TestBot::new().await?;
    bot.service
        .handle_message(&admin_message(CHANNEL, "!restrict_channel !buy"))
        .await;
    bot.service
        .handle_message(&admin_message(CHANNEL, "!add_command !hi hello"))
        .await;
    bot.service
        .handle_message(&admin_message(CHANNEL, "!whitelist_add 77"))
        .await;

    let TestBot { dir, service, .. } = bot;
    drop(service);
    let bot = TestBot::in_dir(dir).await?;

    let state = bot.service.state();
    assert!(state.restrictions.read().await.is_restricted(CHANNEL));
    assert_eq!(state.custom_commands.read().await.get("!hi"), Some("hello"));
    assert!(state.whitelist.read().await.contains("77"));
    Ok(())
}

#[tokio::test]
async fn test_reload_data_reads_external_edits() -> Result<(), Error> {
    let bot = TestBot::new().await?;
    std::fs::write(
        bot.dir.path().join("restricted_channels.json"),
        format!(r#"{{"{CHANNEL}": ["!ok"]}}"#),
    )?;
    assert!(!bot.service.state().restrictions.read().await.is_restricted(CHANNEL));

    bot.service.handle_message(&admin_message(CHANNEL, "!reload_data")).await;
    assert_eq!(
        bot.gateway.sent_texts().await,
        vec!["All data reloaded from files.".to_string()]
    );
    let outcome = bot.service.handle_message(&message(CHANNEL, USER, "!ok go")).await;
    assert_eq!(outcome.action, ModerationAction::Allow);
    Ok(())
}

#[tokio::test]
async fn test_failed_delete_sends_no_warning() -> Result<(), Error> {
    let bot = TestBot::new().await?;
    bot.service
        .handle_message(&admin_message(CHANNEL, "!restrict_channel !buy"))
        .await;
    let before = bot.gateway.calls().await.len();

    let msg = message(CHANNEL, USER, "hello");
    bot.gateway.fail_deletes_of(&msg.message_id).await;
    let outcome = bot.service.handle_message(&msg).await;

    assert!(matches!(outcome.action, ModerationAction::DeleteAndWarn(_)));
    assert!(outcome.report.deleted.is_empty());
    assert!(outcome.report.sent.is_empty());
    assert!(outcome.report.warning_cleanup.is_none());
    assert_eq!(bot.gateway.calls().await.len(), before);
    Ok(())
}

#[tokio::test]
async fn test_send_failure_is_swallowed() -> Result<(), Error> {
    let bot = TestBot::new().await?;
    bot.service
        .handle_message(&admin_message(CHANNEL, "!add_command !hi hello"))
        .await;
    bot.gateway.fail_sends_in("200").await;

    let outcome = bot.service.handle_message(&message("200", USER, "!hi")).await;
    assert_eq!(outcome.action, ModerationAction::SendCustomResponse("hello".into()));
    assert!(outcome.report.sent.is_empty());

    // The bot keeps working afterwards.
    let outcome = bot.service.handle_message(&message(CHANNEL, USER, "!hi")).await;
    assert_eq!(outcome.report.sent.len(), 1);
    Ok(())
}

// Paused clock: the cleanup timer cannot fire before the failure is installed.
#[tokio::test(start_paused = true)]
async fn test_failed_warning_cleanup_is_swallowed() -> Result<(), Error> {
    let bot = TestBot::new().await?;
    bot.service
        .handle_message(&admin_message(CHANNEL, "!restrict_channel !buy"))
        .await;

    let outcome = bot.service.handle_message(&message(CHANNEL, USER, "nope")).await;
    let warning: MessageRef = outcome.report.sent[0].clone();
    bot.gateway.fail_deletes_of(&warning.message_id).await;
    assert!(!outcome.report.warning_cleanup.as_ref().is_some_and(|h| h.is_finished()));

    let cleanup = outcome.report.warning_cleanup.expect("warning cleanup scheduled");
    cleanup.await.expect("cleanup task must not panic");
    assert!(!bot.gateway.deleted().await.contains(&warning));
    Ok(())
}
