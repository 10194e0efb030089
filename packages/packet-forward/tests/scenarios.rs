//! End to end flows through the public API, the way a host chain drives it:
//! a transfer arrives, gets forwarded, and the transport later reports back.

use std::time::Duration;

use cosmwasm_std::testing::mock_env;
use cosmwasm_std::{to_json_vec, Coin, Decimal, Env, StdAck};
use packet_forward::testing::{mock_forward_dependencies, OwnedForwardDeps};
use packet_forward::{
    export_genesis, forward, handle_outcome, import_genesis_json, load_in_flight,
    may_load_in_flight, set_params, ForwardConfig, ForwardMiddleware, ForwardRequest,
    PacketKey, PacketOutcome, Params, ReceivedTransfer, RecvResponse, Resolution,
};

const REFUND_TIMEOUT: Duration = Duration::from_secs(3600);

fn setup() -> OwnedForwardDeps {
    let mut deps = mock_forward_dependencies();
    set_params(&mut deps.storage, &Params::new(Decimal::percent(1))).unwrap();
    deps
}

fn forward_request(retries: u32) -> ForwardRequest {
    ForwardRequest {
        original_sender: "cosmos1sender".to_string(),
        refund_channel: "channel-0".to_string(),
        refund_port: "transfer".to_string(),
        forward_channel: "channel-1".to_string(),
        forward_port: "transfer".to_string(),
        receiver: "osmo1receiver".to_string(),
        amount: Coin::new(1000u128, "uatom"),
        retries,
        timeout: Duration::from_secs(600),
        memo: None,
    }
}

fn later(seconds: u64) -> Env {
    let mut env = mock_env();
    env.block.time = env.block.time.plus_seconds(seconds);
    env
}

#[test]
fn scenario_a_fee_is_deducted_and_packet_tracked() {
    let mut deps = setup();
    let res = forward(deps.as_mut(), &mock_env(), forward_request(2)).unwrap();

    assert_eq!(res.fee.amount.u128(), 10);
    assert_eq!(res.forwarded.amount.u128(), 990);
    let packet = load_in_flight(&deps.storage, &res.key).unwrap();
    assert_eq!(packet.retries_remaining, 2);
}

#[test]
fn scenario_b_timeout_retries() {
    let mut deps = setup();
    let first = forward(deps.as_mut(), &mock_env(), forward_request(2)).unwrap().key;

    let res = handle_outcome(
        deps.as_mut(),
        &later(601),
        REFUND_TIMEOUT,
        &first,
        PacketOutcome::Timeout,
    )
    .unwrap();
    let Resolution::Retried { key: second, retries_remaining } = &res.resolution else {
        panic!("expected a retry, got {:?}", res.resolution);
    };
    assert_eq!(*retries_remaining, 1);
    assert_ne!(second, &first);
    assert_eq!(may_load_in_flight(&deps.storage, &first).unwrap(), None);
    assert_eq!(load_in_flight(&deps.storage, second).unwrap().retries_remaining, 1);
}

#[test]
fn scenario_c_exhausted_retries_refund() {
    let mut deps = setup();
    let key = forward(deps.as_mut(), &mock_env(), forward_request(0)).unwrap().key;

    let res = handle_outcome(
        deps.as_mut(),
        &later(601),
        REFUND_TIMEOUT,
        &key,
        PacketOutcome::Timeout,
    )
    .unwrap();
    assert!(matches!(res.resolution, Resolution::Refunded { .. }));
    assert_eq!(may_load_in_flight(&deps.storage, &key).unwrap(), None);

    let (_, refund) = deps.transfer.sent.last().unwrap();
    assert_eq!(refund.receiver, "cosmos1sender");
    assert_eq!(refund.source_channel, "channel-0");
    assert_eq!(refund.source_port, "transfer");
    assert_eq!(refund.amount, Coin::new(990u128, "uatom"));
}

#[test]
fn scenario_d_success_removes_record() {
    let mut deps = setup();
    let key = forward(deps.as_mut(), &mock_env(), forward_request(2)).unwrap().key;
    let sent = deps.transfer.sent.len();

    let res = handle_outcome(
        deps.as_mut(),
        &later(5),
        REFUND_TIMEOUT,
        &key,
        PacketOutcome::Success,
    )
    .unwrap();
    assert_eq!(res.resolution, Resolution::Completed);
    assert_eq!(may_load_in_flight(&deps.storage, &key).unwrap(), None);
    assert_eq!(deps.transfer.sent.len(), sent);
}

#[test]
fn scenario_e_unknown_key_is_a_no_op() {
    let mut deps = setup();
    let tracked = forward(deps.as_mut(), &mock_env(), forward_request(1)).unwrap().key;
    let before = export_genesis(&deps.storage).unwrap();

    let res = handle_outcome(
        deps.as_mut(),
        &later(5),
        REFUND_TIMEOUT,
        &PacketKey::new("channel-1", "transfer", 999),
        PacketOutcome::Timeout,
    )
    .unwrap();
    assert_eq!(res.resolution, Resolution::Untracked);
    assert_eq!(export_genesis(&deps.storage).unwrap(), before);
    assert!(may_load_in_flight(&deps.storage, &tracked).unwrap().is_some());
}

#[test]
fn state_survives_a_restart() {
    let mut deps = setup();
    let middleware = ForwardMiddleware::new(ForwardConfig {
        retries_on_timeout: 1,
        refund_timeout: REFUND_TIMEOUT,
        ..ForwardConfig::default()
    });
    let memo = r#"{"forward":{"receiver":"osmo1receiver","port":"transfer","channel":"channel-1"}}"#;
    let transfer = ReceivedTransfer {
        sender: "cosmos1sender".to_string(),
        dest_channel: "channel-0".to_string(),
        dest_port: "transfer".to_string(),
        amount: Coin::new(5000u128, "uatom"),
        memo: Some(memo.to_string()),
    };
    let RecvResponse::Forwarded(forwarded) = middleware
        .on_recv_packet(deps.as_mut(), &mock_env(), transfer)
        .unwrap()
    else {
        panic!("expected a forward");
    };

    // stop the node, bring up a fresh one from the exported snapshot
    let snapshot = to_json_vec(&export_genesis(&deps.storage).unwrap()).unwrap();
    let mut restarted = mock_forward_dependencies();
    import_genesis_json(&mut restarted.storage, &snapshot).unwrap();
    assert_eq!(
        export_genesis(&restarted.storage).unwrap(),
        export_genesis(&deps.storage).unwrap()
    );

    // outcomes keep resolving against the imported entries
    let res = middleware
        .on_acknowledgement(
            restarted.as_mut(),
            &later(30),
            &forwarded.key,
            &StdAck::error("receiver rejected"),
        )
        .unwrap();
    assert!(matches!(
        res.resolution,
        Resolution::Retried {
            retries_remaining: 0,
            ..
        }
    ));
}
