// system-tests/tests/suites/callback_flow.rs
// ============================================================================
// Module: Callback Flow Tests
// Description: Two-step callback login against the OpenAM stub.
// Purpose: Verify challenge issuance, echoed submissions, and `noSession`.
// Dependencies: openam-contract, helpers, serde_json
// ============================================================================

//! ## Overview
//! Two-step callback login against the OpenAM stub. The first POST must
//! return a challenge; the filled challenge must be echoed back intact apart
//! from the first input value of each credential callback.

use helpers::artifacts::TestReporter;
use helpers::openam_stub::STUB_PASSWORD;
use helpers::openam_stub::StubBehavior;
use helpers::openam_stub::spawn_openam_stub;
use helpers::target::stub_client;
use openam_contract::CallbackKind;
use openam_contract::ResponseShape;
use openam_contract::Scenario;
use openam_contract::Step;
use openam_contract::SubmitOptions;
use openam_contract::scenarios::fetch_challenge;
use serde_json::Value;

use crate::helpers;

#[test]
fn challenge_offers_name_and_password_callbacks() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_openam_stub(StubBehavior::default())?;
    let (client, _config) = stub_client(&stub)?;

    let exchange = client.request_challenge()?;
    exchange.expect_status(200)?;
    assert!(exchange.json()?.get("callbacks").is_some_and(Value::is_array));

    let challenge = fetch_challenge(&client)?;
    assert!(challenge.has(CallbackKind::Name));
    assert!(challenge.has(CallbackKind::Password));
    assert!(challenge.auth_id().is_some_and(|id| !id.is_empty()));
    Ok(())
}

#[test]
fn callback_valid_credentials_return_session() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("callback_valid_credentials_return_session")?;
    let stub = spawn_openam_stub(StubBehavior::default())?;
    let (client, config) = stub_client(&stub)?;

    let challenge = fetch_challenge(&client)?;
    let answered = challenge.answered(&config.credentials)?;
    let exchange = client.submit_callbacks(&answered, SubmitOptions::default())?;
    exchange.expect_status(200)?;
    ResponseShape::Session.check(Step::Submit, exchange.json()?)?;

    reporter.pass(&client, vec!["callback login returned successUrl and tokenId".to_string()])?;
    Ok(())
}

#[test]
fn callback_invalid_username_is_unauthorized() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("callback_invalid_username_is_unauthorized")?;
    let stub = spawn_openam_stub(StubBehavior::default())?;
    let (client, config) = stub_client(&stub)?;

    let challenge = fetch_challenge(&client)?;
    let answered = challenge.answered(&config.credentials.with_username("invalid"))?;
    client.submit_callbacks(&answered, SubmitOptions::default())?.expect_status(401)?;

    reporter.pass(&client, vec!["unknown username rejected with 401".to_string()])?;
    Ok(())
}

#[test]
fn callback_invalid_password_is_unauthorized() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("callback_invalid_password_is_unauthorized")?;
    let stub = spawn_openam_stub(StubBehavior::default())?;
    let (client, config) = stub_client(&stub)?;

    let challenge = fetch_challenge(&client)?;
    let answered = challenge.answered(&config.credentials.with_password("invalid"))?;
    client.submit_callbacks(&answered, SubmitOptions::default())?.expect_status(401)?;

    reporter.pass(&client, vec!["wrong password rejected with 401".to_string()])?;
    Ok(())
}

#[test]
fn callback_no_session_returns_message() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("callback_no_session_returns_message")?;
    let stub = spawn_openam_stub(StubBehavior::default())?;
    let (client, config) = stub_client(&stub)?;

    let challenge = fetch_challenge(&client)?;
    let answered = challenge.answered(&config.credentials)?;
    let exchange = client.submit_callbacks(
        &answered,
        SubmitOptions {
            no_session: true,
        },
    )?;
    exchange.expect_status(200)?;
    let keys = ResponseShape::NoSession.check(Step::Submit, exchange.json()?)?;
    assert_eq!(keys, ["message", "successUrl"]);

    let requests = stub.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].query.is_none());
    assert_eq!(requests[1].query.as_deref(), Some("noSession=true"));

    reporter.pass(&client, vec!["noSession login returned successUrl and message".to_string()])?;
    Ok(())
}

#[test]
fn submission_echoes_challenge_fields() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_openam_stub(StubBehavior::default())?;
    let (client, config) = stub_client(&stub)?;

    let challenge = fetch_challenge(&client)?;
    let answered = challenge.answered(&config.credentials)?;
    client.submit_callbacks(&answered, SubmitOptions::default())?.expect_status(200)?;

    let requests = stub.requests();
    let submitted = requests
        .get(1)
        .and_then(|request| request.body.clone())
        .ok_or("submission body missing")?;
    assert_eq!(submitted.get("authId").and_then(Value::as_str), challenge.auth_id());
    assert_eq!(submitted.get("stage"), challenge.rest.get("stage"));
    let callbacks = submitted.get("callbacks").and_then(Value::as_array).ok_or("no callbacks")?;
    assert_eq!(callbacks.len(), 2);
    for callback in callbacks {
        assert!(callback.get("output").is_some_and(Value::is_array));
        assert!(callback.pointer("/input/0/name").is_some_and(Value::is_string));
    }
    assert_eq!(
        callbacks[1].pointer("/input/0/value").and_then(Value::as_str),
        Some(STUB_PASSWORD)
    );
    Ok(())
}

#[test]
fn challenge_is_single_use() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_openam_stub(StubBehavior::default())?;
    let (client, config) = stub_client(&stub)?;

    let answered = fetch_challenge(&client)?.answered(&config.credentials)?;
    client.submit_callbacks(&answered, SubmitOptions::default())?.expect_status(200)?;
    client.submit_callbacks(&answered, SubmitOptions::default())?.expect_status(401)?;
    Ok(())
}

#[test]
fn callback_transcript_redacts_password_values() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_openam_stub(StubBehavior::default())?;
    let (client, config) = stub_client(&stub)?;

    Scenario::CallbackValid.run(&client, &config.credentials)?;

    let transcript = client.transcript();
    let steps: Vec<Step> = transcript.iter().map(|entry| entry.step).collect();
    assert_eq!(steps, [Step::Challenge, Step::Submit]);
    let rendered = serde_json::to_string(&transcript)?;
    assert!(!rendered.contains(STUB_PASSWORD));
    Ok(())
}

#[test]
fn callback_scenarios_pass_against_conforming_stub() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_openam_stub(StubBehavior::default())?;
    let (client, config) = stub_client(&stub)?;

    for scenario in [
        Scenario::CallbackValid,
        Scenario::CallbackInvalidUsername,
        Scenario::CallbackInvalidPassword,
        Scenario::CallbackNoSession,
    ] {
        let report = scenario.run(&client, &config.credentials)?;
        assert_eq!(report.status, scenario.expected_status());
        assert_eq!(report.steps, 2);
    }
    Ok(())
}

#[test]
fn direct_and_callback_flows_agree() -> Result<(), Box<dyn std::error::Error>> {
    let stub = spawn_openam_stub(StubBehavior::default())?;
    let (client, config) = stub_client(&stub)?;

    let direct = Scenario::DirectValid.run(&client, &config.credentials)?;
    let callback = Scenario::CallbackValid.run(&client, &config.credentials)?;
    assert_eq!(direct.fingerprint(), callback.fingerprint());
    Ok(())
}
