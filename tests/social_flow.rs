//! End-to-end scenarios across the four stores, driven through the core
//! API the way the HTTP adapter drives it.

use agentnet::interactions::InteractionLog;
use agentnet::posts::{PostError, PostLedger};
use agentnet::registry::{AgentDirectory, DEFAULT_REGISTRATION_FEE};
use agentnet::token::TokenLedger;
use agentnet::transfers::{TransferError, TransferLedger};
use agentnet::types::{Address, TxHash};

const TREASURY: Address = Address::from_low_u64(0xfee);

#[test]
fn alice_and_bob_full_social_flow() {
    let mut directory = AgentDirectory::new(DEFAULT_REGISTRATION_FEE, TREASURY);
    let mut token = TokenLedger::new();
    let mut posts = PostLedger::new();
    let mut interactions = InteractionLog::new();

    let alice = Address::from_low_u64(0xa);
    let bob = Address::from_low_u64(0xb);
    token.mint(alice, 50);
    token.mint(bob, 50);

    // Both agents register and pay the fee.
    directory
        .register(1, "Alice", "Assistant", "conversation", alice, &mut token)
        .unwrap();
    directory
        .register(2, "Bob", "Analyzer", "data analysis", bob, &mut token)
        .unwrap();
    assert_eq!(token.balance_of(alice), 50 - DEFAULT_REGISTRATION_FEE);
    assert_eq!(token.balance_of(bob), 50 - DEFAULT_REGISTRATION_FEE);
    assert_eq!(token.balance_of(TREASURY), 2 * DEFAULT_REGISTRATION_FEE);

    // Alice posts, Bob likes it once.
    let post = posts.create_post(1, "hello", &directory).unwrap();
    assert_eq!(post.id, 1);
    assert_eq!(posts.like_post(post.id, 2, &directory).unwrap(), 1);

    // A second like from Bob fails and leaves the count alone.
    assert_eq!(
        posts.like_post(post.id, 2, &directory).unwrap_err(),
        PostError::AlreadyLiked {
            post_id: 1,
            agent_id: 2
        }
    );
    assert_eq!(posts.get_post(1).unwrap().likes_count, 1);

    // Bob comments on the post.
    interactions
        .comment_on_post(post.id, 2, "nice", &directory, &posts)
        .unwrap();
    assert_eq!(interactions.get_comments_count(post.id), 1);

    // Bob DMs Alice; both see the message, the global total counts it once.
    interactions.send_dm(2, 1, "hi", &directory).unwrap();
    assert_eq!(interactions.get_dms_count(1), 1);
    assert_eq!(interactions.get_dms_count(2), 1);
    assert_eq!(interactions.get_total_direct_messages(), 1);
    assert_eq!(interactions.get_total_comments(), 1);
}

#[test]
fn transfer_ledger_scenario() {
    let mut transfers = TransferLedger::new();

    let h1 = TxHash::from_low_u64(0x11);
    let sender = Address::from_low_u64(0x5);
    let receiver = Address::from_low_u64(0x6);

    transfers.record(h1, sender, receiver, 100).unwrap();
    assert_eq!(transfers.get_total(), 1);

    // Replaying the same hash fails and the total is unchanged.
    assert_eq!(
        transfers.record(h1, sender, receiver, 100).unwrap_err(),
        TransferError::DuplicateHash(h1)
    );
    assert_eq!(transfers.get_total(), 1);

    // Each participant sees exactly one record.
    assert_eq!(transfers.get_by_address(sender).len(), 1);
    assert_eq!(transfers.get_by_address(receiver).len(), 1);
    assert_eq!(transfers.get(h1).unwrap().amount, 100);
}

#[test]
fn creation_ids_stay_gap_free_across_interleaved_failures() {
    let mut directory = AgentDirectory::new(DEFAULT_REGISTRATION_FEE, TREASURY);
    let mut token = TokenLedger::new();
    let mut posts = PostLedger::new();

    let owner = Address::from_low_u64(0xa);
    token.mint(owner, 100);
    directory
        .register(1, "Agent", "Assistant", "caps", owner, &mut token)
        .unwrap();

    // Failed creations must not consume ids.
    for round in 1..=3u64 {
        let _ = posts.create_post(999, "not registered", &directory);
        let _ = posts.create_post(1, "", &directory);
        let post = posts.create_post(1, format!("post {round}"), &directory).unwrap();
        assert_eq!(post.id, round);
    }
    assert_eq!(posts.get_total_posts(), 3);
}

#[test]
fn transfer_pagination_matches_full_listing() {
    let mut transfers = TransferLedger::new();
    let sender = Address::from_low_u64(1);
    let receiver = Address::from_low_u64(2);
    for i in 1..=10u64 {
        transfers
            .record(TxHash::from_low_u64(i), sender, receiver, i as u128)
            .unwrap();
    }

    for limit in [1usize, 3, 10, 25] {
        let mut rebuilt = Vec::new();
        let mut offset = 0;
        loop {
            let page = transfers.get_paginated(offset, limit);
            if page.is_empty() {
                break;
            }
            rebuilt.extend_from_slice(page);
            offset += limit;
        }
        assert_eq!(rebuilt, transfers.get_all(), "limit {limit}");
    }
}
