#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::{Arc, Mutex};

use rand::{Rng, RngCore};
use rustysrtp::config::Config;
use rustysrtp::log::{LogLevel, LoggerHandle, NoopLogSink};
use rustysrtp::srtp::{
    CryptoPolicy, Direction, EventSink, KeyingRole, MasterKey, Policy, Ssrc, SrtpError,
    SrtpEvent, SrtpEventData, SrtpProfile, SrtpSession, SrtpSessionConfig,
};

fn rtp(ssrc: u32, seq: u16, payload: &[u8]) -> Vec<u8> {
    let mut p = vec![0x80, 0x60];
    p.extend_from_slice(&seq.to_be_bytes());
    p.extend_from_slice(&1000u32.to_be_bytes());
    p.extend_from_slice(&ssrc.to_be_bytes());
    p.extend_from_slice(payload);
    p
}

fn rtcp(ssrc: u32) -> Vec<u8> {
    let mut p = vec![0x81, 0xc9, 0x00, 0x07];
    p.extend_from_slice(&ssrc.to_be_bytes());
    p.extend_from_slice(&[0x11; 24]);
    p
}

fn noop() -> Arc<NoopLogSink> {
    Arc::new(NoopLogSink)
}

fn template_pair(key: &MasterKey) -> (SrtpSession, SrtpSession) {
    let tx = Policy::new(
        Ssrc::any_outbound(),
        CryptoPolicy::rtp_default(),
        CryptoPolicy::rtcp_default(),
        key.clone(),
    );
    let rx = Policy::new(
        Ssrc::any_inbound(),
        CryptoPolicy::rtp_default(),
        CryptoPolicy::rtcp_default(),
        key.clone(),
    );
    (
        SrtpSession::create(&[tx], noop()).unwrap(),
        SrtpSession::create(&[rx], noop()).unwrap(),
    )
}

#[test]
fn templates_follow_many_ssrcs_with_random_traffic() {
    let key = MasterKey::random(30);
    let (mut tx, mut rx) = template_pair(&key);
    let mut rng = rand::thread_rng();

    for ssrc in [1u32, 2, 0xffff_ffff] {
        for seq in 0..50u16 {
            let mut payload = vec![0u8; rng.gen_range(0..200)];
            rng.fill_bytes(&mut payload);
            let plain = rtp(ssrc, seq, &payload);
            let mut pkt = plain.clone();
            tx.protect(&mut pkt).unwrap();
            rx.unprotect(&mut pkt).unwrap();
            assert_eq!(pkt, plain);
        }
    }
    assert_eq!(tx.stream_count(), 3);
    assert_eq!(rx.stream_count(), 3);
    assert_eq!(rx.stream(2).unwrap().direction(), Direction::Receiver);
    assert!(rx.stream(2).unwrap().is_from_template());
    assert_eq!(rx.stream(2).unwrap().packet_index(), 49);
}

#[test]
fn out_of_order_delivery_inside_the_window() {
    let (mut tx, mut rx) = template_pair(&MasterKey::random(30));
    let mut wire: Vec<Vec<u8>> = (0..20)
        .map(|seq| {
            let mut p = rtp(9, seq, b"media");
            tx.protect(&mut p).unwrap();
            p
        })
        .collect();
    wire.reverse();
    for mut p in wire {
        rx.unprotect(&mut p).unwrap();
    }
    assert_eq!(rx.stream(9).unwrap().packet_index(), 19);
}

#[test]
fn roc_wraps_across_sequence_rollover() {
    let (mut tx, mut rx) = template_pair(&MasterKey::random(30));
    for seq in (0xfff0..=0xffffu16).chain(0..0x10) {
        let plain = rtp(5, seq, b"wrap");
        let mut pkt = plain.clone();
        tx.protect(&mut pkt).unwrap();
        rx.unprotect(&mut pkt).unwrap();
        assert_eq!(pkt, plain);
    }
    assert_eq!(tx.get_stream_roc(5).unwrap(), 1);
    assert_eq!(rx.get_stream_roc(5).unwrap(), 1);
}

#[test]
fn rtcp_and_rtp_share_a_stream() {
    let (mut tx, mut rx) = template_pair(&MasterKey::random(30));
    let plain = rtcp(77);
    for _ in 0..3 {
        let mut pkt = plain.clone();
        tx.protect_rtcp(&mut pkt).unwrap();
        rx.unprotect_rtcp(&mut pkt).unwrap();
        assert_eq!(pkt, plain);
    }
    assert_eq!(tx.stream(77).unwrap().rtcp_index(), 3);

    let mut pkt = rtp(77, 1, b"x");
    tx.protect(&mut pkt).unwrap();
    rx.unprotect(&mut pkt).unwrap();
    assert_eq!(rx.stream_count(), 1);
}

#[test]
fn mki_selects_the_master_key() {
    let keys = vec![
        MasterKey::with_mki(vec![0x11; 30], vec![0, 0, 0, 1]),
        MasterKey::with_mki(vec![0x22; 30], vec![0, 0, 0, 2]),
    ];
    let policy = |ssrc| {
        Policy::new(
            ssrc,
            CryptoPolicy::rtp_default(),
            CryptoPolicy::rtcp_default(),
            keys[0].clone(),
        )
        .with_keys(keys.clone())
    };
    let mut tx = SrtpSession::create(&[policy(Ssrc::any_outbound())], noop()).unwrap();
    let mut rx = SrtpSession::create(&[policy(Ssrc::any_inbound())], noop()).unwrap();

    assert_eq!(tx.get_protect_trailer_length(true, 1).unwrap(), 14);
    assert_eq!(tx.get_protect_rtcp_trailer_length(true, 0).unwrap(), 18);

    let plain = rtp(3, 1, b"keyed by mki");
    let mut pkt = plain.clone();
    tx.protect_mki(&mut pkt, true, 1).unwrap();
    assert_eq!(pkt.len(), plain.len() + 14);
    assert_eq!(&pkt[plain.len()..plain.len() + 4], &[0, 0, 0, 2]);
    rx.unprotect_mki(&mut pkt, true).unwrap();
    assert_eq!(pkt, plain);

    let mut pkt = rtp(3, 2, b"unknown key");
    tx.protect_mki(&mut pkt, true, 0).unwrap();
    let n = pkt.len();
    pkt[n - 11] = 9;
    assert_eq!(rx.unprotect_mki(&mut pkt, true), Err(SrtpError::BadMki));

    assert_eq!(
        tx.protect_mki(&mut rtp(3, 3, b"x"), true, 2),
        Err(SrtpError::BadMki)
    );
}

#[test]
fn roc_resync_out_of_band() {
    let key = MasterKey::new(vec![0x42; 30]);
    let policy = Policy::new(
        Ssrc::specific(0x1234),
        CryptoPolicy::rtp_default(),
        CryptoPolicy::rtcp_default(),
        key,
    );
    let mut tx = SrtpSession::create(&[policy.clone()], noop()).unwrap();
    let mut late_rx = SrtpSession::create(&[policy.clone()], noop()).unwrap();
    let mut synced_rx = SrtpSession::create(&[policy], noop()).unwrap();

    tx.set_stream_roc(0x1234, 2).unwrap();
    let plain = rtp(0x1234, 100, b"joined late");
    let mut pkt = plain.clone();
    tx.protect(&mut pkt).unwrap();
    assert_eq!(tx.get_stream_roc(0x1234).unwrap(), 2);

    let mut copy = pkt.clone();
    assert_eq!(late_rx.unprotect(&mut copy), Err(SrtpError::AuthFail));

    synced_rx.set_stream_roc(0x1234, 2).unwrap();
    synced_rx.unprotect(&mut pkt).unwrap();
    assert_eq!(pkt, plain);
    assert_eq!(synced_rx.get_stream_roc(0x1234).unwrap(), 2);

    assert_eq!(tx.set_stream_roc(0x9999, 1), Err(SrtpError::BadParam));
    assert_eq!(tx.get_stream_roc(0x9999), Err(SrtpError::BadParam));
}

#[test]
fn rekey_keeps_the_sequence_space() {
    let old = MasterKey::new(vec![1u8; 30]);
    let new = MasterKey::new(vec![2u8; 30]);
    let (mut tx, mut rx) = template_pair(&old);

    for seq in 0..5 {
        let mut p = rtp(8, seq, b"before");
        tx.protect(&mut p).unwrap();
        rx.unprotect(&mut p).unwrap();
    }
    tx.update_stream(&Policy::new(
        Ssrc::any_outbound(),
        CryptoPolicy::rtp_default(),
        CryptoPolicy::rtcp_default(),
        new.clone(),
    ))
    .unwrap();
    rx.update_stream(&Policy::new(
        Ssrc::any_inbound(),
        CryptoPolicy::rtp_default(),
        CryptoPolicy::rtcp_default(),
        new,
    ))
    .unwrap();

    assert_eq!(tx.stream(8).unwrap().packet_index(), 4);
    assert!(tx.stream(8).unwrap().is_from_template());

    let mut stale = rtp(8, 5, b"old key");
    SrtpSession::create(
        &[Policy::new(
            Ssrc::specific(8),
            CryptoPolicy::rtp_default(),
            CryptoPolicy::rtcp_default(),
            old,
        )],
        noop(),
    )
    .unwrap()
    .protect(&mut stale)
    .unwrap();
    assert_eq!(rx.unprotect(&mut stale), Err(SrtpError::AuthFail));

    let plain = rtp(8, 5, b"after");
    let mut p = plain.clone();
    tx.protect(&mut p).unwrap();
    rx.unprotect(&mut p).unwrap();
    assert_eq!(p, plain);
    assert_eq!(rx.stream(8).unwrap().packet_index(), 5);
}

#[test]
fn events_reach_the_installed_handler() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in = Arc::clone(&seen);
    let sink: Arc<dyn EventSink> = Arc::new(move |d: &SrtpEventData| {
        seen_in.lock().unwrap().push(d.event);
    });

    let policy = Policy::new(
        Ssrc::any_outbound(),
        CryptoPolicy::rtp_default(),
        CryptoPolicy::rtcp_default(),
        MasterKey::new(vec![3u8; 30]),
    )
    .with_key_limit(4, 2);
    let mut tx = SrtpSession::create(&[policy], noop()).unwrap();
    tx.install_event_handler(Some(sink));

    let results: Vec<_> = (0..5).map(|seq| tx.protect(&mut rtp(1, seq, b"k"))).collect();
    assert!(results[..3].iter().all(Result::is_ok));
    assert_eq!(results[3], Err(SrtpError::KeyExpired));
    assert_eq!(results[4], Err(SrtpError::KeyExpired));

    let got = seen.lock().unwrap();
    assert_eq!(got.as_slice(), &[SrtpEvent::KeySoftLimit, SrtpEvent::KeyHardLimit]);
}

#[test]
fn failures_are_logged_as_warnings() {
    let (handle, lines) = LoggerHandle::channel(64);
    let (mut tx, mut rx) = template_pair(&MasterKey::random(30));
    rx.install_log_handler(Arc::new(handle.with_min_level(LogLevel::Warn)));

    let mut pkt = rtp(4, 1, b"tampered");
    tx.protect(&mut pkt).unwrap();
    pkt[12] ^= 0xff;
    assert_eq!(rx.unprotect(&mut pkt), Err(SrtpError::AuthFail));

    let warns: Vec<_> = lines.try_iter().collect();
    assert!(!warns.is_empty());
    assert!(warns.iter().all(|m| m.level >= LogLevel::Warn));
}

#[test]
fn session_from_ini_config() {
    let ini = "\
rtp_suite = aes_gcm_128_16_auth
rtcp_suite = aes_gcm_128_16_auth

[stream.out]
ssrc_type = any_outbound
key = 000102030405060708090a0b0c0d0e0fa0a1a2a3a4a5a6a7a8a9aaab

[stream.in]
ssrc_type = any_inbound
key = 000102030405060708090a0b0c0d0e0fa0a1a2a3a4a5a6a7a8a9aaab
";
    let config = Config::parse(ini);
    let err = SrtpSession::from_config(&config, noop()).map(|_| ());
    // both sections are templates, and a session holds only one
    assert_eq!(err, Err(SrtpError::BadParam));

    let tx_ini = ini.replace("[stream.in]", "[peer.in]");
    let rx_ini = ini.replace("[stream.out]", "[peer.out]");
    let mut tx = SrtpSession::from_config(&Config::parse(&tx_ini), noop()).unwrap();
    let mut rx = SrtpSession::from_config(&Config::parse(&rx_ini), noop()).unwrap();

    let plain = rtp(0xabc, 7, b"configured");
    let mut pkt = plain.clone();
    tx.protect(&mut pkt).unwrap();
    assert_eq!(pkt.len(), plain.len() + 16);
    rx.unprotect(&mut pkt).unwrap();
    assert_eq!(pkt, plain);
}

#[test]
fn dtls_keying_material_drives_both_peers() {
    for profile in [
        SrtpProfile::Aes128CmHmacSha1_32,
        SrtpProfile::NullHmacSha1_80,
        SrtpProfile::AeadAes256Gcm,
    ] {
        let mut material = vec![0u8; 2 * (profile.master_key_len() + profile.master_salt_len())];
        rand::thread_rng().fill_bytes(&mut material);

        let client =
            SrtpSessionConfig::from_keying_material(profile, &material, KeyingRole::Client).unwrap();
        let server =
            SrtpSessionConfig::from_keying_material(profile, &material, KeyingRole::Server).unwrap();
        let (mut client_tx, mut client_rx) = client.sessions(noop()).unwrap();
        let (mut server_tx, mut server_rx) = server.sessions(noop()).unwrap();

        let plain = rtp(0x51, 1, b"to server");
        let mut pkt = plain.clone();
        client_tx.protect(&mut pkt).unwrap();
        server_rx.unprotect(&mut pkt).unwrap();
        assert_eq!(pkt, plain, "{profile:?}");

        let plain = rtcp(0x52);
        let mut pkt = plain.clone();
        server_tx.protect_rtcp(&mut pkt).unwrap();
        client_rx.unprotect_rtcp(&mut pkt).unwrap();
        assert_eq!(pkt, plain, "{profile:?}");
    }
}

#[test]
fn removed_stream_falls_back_to_template() {
    let (mut tx, mut rx) = template_pair(&MasterKey::random(30));
    let mut pkt = rtp(6, 1, b"x");
    tx.protect(&mut pkt).unwrap();
    rx.unprotect(&mut pkt).unwrap();

    rx.remove_stream(6).unwrap();
    assert_eq!(rx.remove_stream(6), Err(SrtpError::NoCtx));
    assert!(rx.stream(6).is_none());

    let mut pkt = rtp(6, 2, b"y");
    tx.protect(&mut pkt).unwrap();
    rx.unprotect(&mut pkt).unwrap();
    assert_eq!(rx.stream_count(), 1);
}
