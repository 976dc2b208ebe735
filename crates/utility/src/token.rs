use rand::{distributions::Uniform, Rng};

const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated share tokens, e.g. `ko58de`.
pub const SHARE_TOKEN_LENGTH: usize = 6;

/// Random lowercase alphanumeric token used in public share urls.
pub fn share_token() -> String {
    random_token(SHARE_TOKEN_LENGTH)
}

pub fn random_token(length: usize) -> String {
    let distribution = Uniform::from(0..TOKEN_ALPHABET.len());
    rand::thread_rng()
        .sample_iter(distribution)
        .take(length)
        .map(|index| TOKEN_ALPHABET[index] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_use_the_alphabet() {
        for _ in 0..100 {
            let token = share_token();
            assert_eq!(token.len(), SHARE_TOKEN_LENGTH);
            assert!(token
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }
}
