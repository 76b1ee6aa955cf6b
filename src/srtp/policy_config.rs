use crate::config::Config;
use crate::srtp::crypto_policy::CryptoPolicy;
use crate::srtp::master_key::MasterKey;
use crate::srtp::policy::{Policy, Ssrc, SsrcType};
use crate::srtp::srtp_error::SrtpError;

/// Sections whose name starts with this prefix describe one stream each.
pub const STREAM_SECTION_PREFIX: &str = "stream";

/// Builds one policy per `[stream*]` section, in section-name order.
///
/// Keys missing from a section fall back to the global keys at the top of
/// the file, so shared settings (suites, window size) can be written once.
///
/// ```ini
/// rtp_suite = aes_cm_128_hmac_sha1_80
///
/// [stream.audio]
/// ssrc = 0xcafebabe
/// key = 00112233445566778899aabbccddeeff000102030405060708090a0b0c0d
///
/// [stream.peer]
/// ssrc_type = any_inbound
/// keys = 0011...:01, 2233...:02
/// ```
pub fn policies_from_config(config: &Config) -> Result<Vec<Policy>, SrtpError> {
    config
        .section_names()
        .into_iter()
        .filter(|name| name.starts_with(STREAM_SECTION_PREFIX))
        .map(|name| policy_from_section(config, name))
        .collect()
}

pub fn policy_from_section(config: &Config, section: &str) -> Result<Policy, SrtpError> {
    let get = |key: &str| config.lookup(section, key);

    let kind = match get("ssrc_type") {
        None => SsrcType::Specific,
        Some(name) => SsrcType::from_name(name)
            .ok_or_else(|| config_error(section, format!("unknown ssrc_type '{name}'")))?,
    };
    let ssrc = match kind {
        SsrcType::Specific => {
            let value = get("ssrc").ok_or_else(|| config_error(section, "missing ssrc"))?;
            Ssrc::specific(parse_u32(value)?)
        }
        SsrcType::AnyInbound => Ssrc::any_inbound(),
        SsrcType::AnyOutbound => Ssrc::any_outbound(),
    };

    let rtp = suite(
        section,
        config.get_non_empty_or_default(section, "rtp_suite", "rtp_default"),
    )?;
    let rtcp = suite(
        section,
        config.get_non_empty_or_default(section, "rtcp_suite", "rtcp_default"),
    )?;

    let keys = match (get("keys"), get("key")) {
        (Some(list), _) => list
            .split(',')
            .map(|entry| parse_key_entry(entry.trim()))
            .collect::<Result<Vec<_>, _>>()?,
        (None, Some(hex_key)) => vec![MasterKey::new(hex::decode(hex_key)?)],
        (None, None) => return Err(config_error(section, "missing key")),
    };
    let first = keys
        .first()
        .cloned()
        .ok_or_else(|| config_error(section, "empty key list"))?;

    let mut policy = Policy::new(ssrc, rtp, rtcp, first).with_keys(keys);

    if let Some(v) = get("window_size") {
        policy = policy.with_window_size(v.parse()?);
    }
    if let Some(v) = get("allow_repeat_tx") {
        policy = policy.with_allow_repeat_tx(parse_bool(section, v)?);
    }
    if let Some(v) = get("enc_xtn_hdr") {
        let ids = v
            .split(',')
            .map(|id| id.trim().parse::<u8>())
            .collect::<Result<Vec<_>, _>>()?;
        policy = policy.with_enc_xtn_hdr(ids);
    }
    let limit = get("key_limit").map(parse_u64).transpose()?;
    let soft = get("key_soft_limit").map(parse_u64).transpose()?;
    if limit.is_some() || soft.is_some() {
        let limit = limit.unwrap_or(policy.key_limit);
        let soft = soft.unwrap_or(policy.key_soft_limit);
        policy = policy.with_key_limit(limit, soft);
    }

    policy
        .validate()
        .map_err(|e| config_error(section, format!("invalid policy: {e}")))?;
    Ok(policy)
}

fn suite(section: &str, name: &str) -> Result<CryptoPolicy, SrtpError> {
    CryptoPolicy::from_name(name)
        .ok_or_else(|| config_error(section, format!("unknown suite '{name}'")))
}

/// `hex_key` or `hex_key:hex_mki`.
fn parse_key_entry(entry: &str) -> Result<MasterKey, SrtpError> {
    match entry.split_once(':') {
        Some((key, mki)) => Ok(MasterKey::with_mki(hex::decode(key)?, hex::decode(mki)?)),
        None => Ok(MasterKey::new(hex::decode(entry)?)),
    }
}

fn parse_u32(v: &str) -> Result<u32, SrtpError> {
    match v.strip_prefix("0x").or_else(|| v.strip_prefix("0X")) {
        Some(hex) => Ok(u32::from_str_radix(hex, 16)?),
        None => Ok(v.parse()?),
    }
}

fn parse_u64(v: &str) -> Result<u64, SrtpError> {
    match v.strip_prefix("0x").or_else(|| v.strip_prefix("0X")) {
        Some(hex) => Ok(u64::from_str_radix(hex, 16)?),
        None => Ok(v.parse()?),
    }
}

fn parse_bool(section: &str, v: &str) -> Result<bool, SrtpError> {
    match v {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(config_error(section, format!("expected a boolean, got '{other}'"))),
    }
}

fn config_error(section: &str, msg: impl std::fmt::Display) -> SrtpError {
    SrtpError::Config(format!("[{section}] {msg}"))
}
