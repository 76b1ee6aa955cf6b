// Key derivation labels (RFC 3711 §4.3.2, RFC 6904 §4.3)
pub const SRTP_LABEL_RTP_ENCRYPTION: u8 = 0x00;
pub const SRTP_LABEL_RTP_AUTH: u8 = 0x01;
pub const SRTP_LABEL_RTP_SALT: u8 = 0x02;
pub const SRTP_LABEL_RTCP_ENCRYPTION: u8 = 0x03;
pub const SRTP_LABEL_RTCP_AUTH: u8 = 0x04;
pub const SRTP_LABEL_RTCP_SALT: u8 = 0x05;
pub const SRTP_LABEL_RTP_HEADER_ENCRYPTION: u8 = 0x06;
pub const SRTP_LABEL_RTP_HEADER_SALT: u8 = 0x07;

// Key and salt sizes
pub const AES_128_KEY_LEN: usize = 16;
pub const AES_192_KEY_LEN: usize = 24;
pub const AES_256_KEY_LEN: usize = 32;
pub const MAX_KEY_LEN: usize = 32;
pub const SALT_LEN: usize = 14; // 112 bits
pub const AEAD_SALT_LEN: usize = 12; // 96 bits
pub const AES_ICM_128_KEY_LEN_WSALT: usize = AES_128_KEY_LEN + SALT_LEN;
pub const AES_ICM_192_KEY_LEN_WSALT: usize = AES_192_KEY_LEN + SALT_LEN;
pub const AES_ICM_256_KEY_LEN_WSALT: usize = AES_256_KEY_LEN + SALT_LEN;
pub const AES_GCM_128_KEY_LEN_WSALT: usize = AES_128_KEY_LEN + AEAD_SALT_LEN;
pub const AES_GCM_256_KEY_LEN_WSALT: usize = AES_256_KEY_LEN + AEAD_SALT_LEN;

// HMAC-SHA1
pub const HMAC_SHA1_KEY_LEN: usize = 20; // 160 bits
pub const HMAC_SHA1_DIGEST_LEN: usize = 20;
pub const AUTH_TAG_LEN_80: usize = 10; // 80 bits truncated
pub const AUTH_TAG_LEN_32: usize = 4;

// GCM tags
pub const GCM_TAG_LEN_8: usize = 8;
pub const GCM_TAG_LEN_16: usize = 16;
pub const MAX_TAG_LEN: usize = 16;

// Master keys / MKI
pub const MAX_NUM_MASTER_KEYS: usize = 16;
pub const MAX_MKI_LEN: usize = 128;

// Replay protection
pub const DEFAULT_REPLAY_WINDOW_SIZE: usize = 128;
pub const MIN_REPLAY_WINDOW_SIZE: usize = 64;
pub const MAX_REPLAY_WINDOW_SIZE: usize = 0x8000; // exclusive
pub const SEQ_NUM_MEDIAN: u64 = 0x8000;
pub const SEQ_NUM_MAX: u64 = 0x1_0000;
pub const MAX_PACKET_INDEX: u64 = 0xffff_ffff_ffff; // 48 bits
pub const RTCP_REPLAY_WINDOW_BITS: u32 = 128;

// Key usage limits
pub const DEFAULT_KEY_LIMIT: u64 = 0xffff_ffff_ffff;
pub const DEFAULT_KEY_SOFT_LIMIT: u64 = 0x1_0000;

// Packet layout
pub const RTP_HEADER_LEN: usize = 12;
pub const RTP_EXTENSION_HEADER_LEN: usize = 4;
pub const RTCP_HEADER_LEN: usize = 8;
pub const SRTCP_TRAILER_LEN: usize = 4;
pub const SRTCP_E_BIT: u32 = 0x8000_0000;
pub const SRTCP_E_BYTE_BIT: u8 = 0x80;
pub const SRTCP_INDEX_MASK: u32 = 0x7fff_ffff;
pub const SRTCP_MAX_INDEX: u32 = 0x7fff_ffff;

// RFC 8285 extension profiles
pub const ONE_BYTE_EXTENSION_PROFILE: u16 = 0xBEDE;
pub const TWO_BYTE_EXTENSION_PROFILE: u16 = 0x1000;
pub const TWO_BYTE_EXTENSION_PROFILE_MASK: u16 = 0xfff0;
