// system-tests/tests/suites/contract_violations.rs
// ============================================================================
// Module: Contract Violation Tests
// Description: Scenarios run against deliberately misbehaving stubs.
// Purpose: Prove each contract breach is caught and reported precisely.
// Dependencies: openam-contract, helpers
// ============================================================================

//! ## Overview
//! Each test switches on one [`StubBehavior`] violation and asserts the
//! scenario fails with the matching [`ContractError`] variant.

use std::net::TcpListener;

use helpers::openam_stub::StubBehavior;
use helpers::openam_stub::spawn_openam_stub;
use helpers::target::stub_client;
use openam_contract::AuthenticateClient;
use openam_contract::CallbackKind;
use openam_contract::ContractError;
use openam_contract::Credentials;
use openam_contract::Scenario;
use openam_contract::Step;
use openam_contract::TargetConfig;

use crate::helpers;

fn run_against(behavior: StubBehavior, scenario: Scenario) -> Result<ContractError, String> {
    let stub = spawn_openam_stub(behavior)?;
    let (client, config) = stub_client(&stub)?;
    match scenario.run(&client, &config.credentials) {
        Ok(report) => Err(format!("{scenario} unexpectedly passed: {}", report.fingerprint())),
        Err(err) => Ok(err),
    }
}

#[test]
fn extra_success_key_is_a_shape_mismatch() -> Result<(), Box<dyn std::error::Error>> {
    let behavior = StubBehavior {
        extra_success_key: true,
        ..StubBehavior::default()
    };
    for (scenario, step) in
        [(Scenario::DirectValid, Step::Direct), (Scenario::CallbackNoSession, Step::Submit)]
    {
        let err = run_against(behavior, scenario)?;
        let ContractError::ShapeMismatch {
            step: observed,
            actual,
            ..
        } = &err
        else {
            return Err(format!("{scenario}: expected shape mismatch, got {err}").into());
        };
        assert_eq!(*observed, step);
        assert!(actual.iter().any(|key| key == "realm"));
        assert!(err.is_assertion());
    }
    Ok(())
}

#[test]
fn missing_password_callback_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let behavior = StubBehavior {
        omit_password_callback: true,
        ..StubBehavior::default()
    };
    let err = run_against(behavior, Scenario::CallbackValid)?;
    assert!(
        matches!(
            err,
            ContractError::MissingCallback {
                step: Step::Challenge,
                kind: CallbackKind::Password
            }
        ),
        "unexpected error: {err}"
    );
    Ok(())
}

#[test]
fn empty_token_is_an_invalid_value() -> Result<(), Box<dyn std::error::Error>> {
    let behavior = StubBehavior {
        empty_token: true,
        ..StubBehavior::default()
    };
    for scenario in [Scenario::DirectValid, Scenario::CallbackValid] {
        let err = run_against(behavior, scenario)?;
        let ContractError::InvalidValue {
            field,
            ..
        } = &err
        else {
            return Err(format!("{scenario}: expected invalid value, got {err}").into());
        };
        assert_eq!(field, "tokenId");
    }
    Ok(())
}

#[test]
fn accepting_wrong_password_is_a_status_mismatch() -> Result<(), Box<dyn std::error::Error>> {
    let behavior = StubBehavior {
        accept_any_password: true,
        ..StubBehavior::default()
    };
    for scenario in [Scenario::DirectInvalidPassword, Scenario::CallbackInvalidPassword] {
        let err = run_against(behavior, scenario)?;
        assert!(
            matches!(
                err,
                ContractError::StatusMismatch {
                    expected: 401,
                    actual: 200,
                    ..
                }
            ),
            "{scenario}: unexpected error: {err}"
        );
    }
    Ok(())
}

#[test]
fn unreachable_target_is_a_transport_error() -> Result<(), Box<dyn std::error::Error>> {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        listener.local_addr()?.port()
    };
    let config = TargetConfig::new(
        &format!("http://127.0.0.1:{port}/openam/json"),
        Credentials::new("demo", "changeit"),
    )?;
    let http = reqwest::blocking::Client::builder().no_proxy().build()?;
    let client = AuthenticateClient::with_client(config.authenticate_url()?, http);

    let err = Scenario::DirectValid
        .run(&client, &config.credentials)
        .err()
        .ok_or("closed port unexpectedly answered")?;
    assert!(
        matches!(
            err,
            ContractError::Transport {
                step: Step::Direct,
                ..
            }
        ),
        "unexpected error: {err}"
    );
    assert!(!err.is_assertion());
    Ok(())
}
