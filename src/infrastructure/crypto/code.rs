//! Booking code generation

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::domain::CodeGenerator;

const PREFIX: &str = "B-";
const CODE_LEN: usize = 8;

/// `B-` followed by eight random upper-case letters and digits.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        let body: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(CODE_LEN)
            .map(|b| char::from(b).to_ascii_uppercase())
            .collect();
        format!("{PREFIX}{body}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_have_expected_shape() {
        let code = RandomCodeGenerator.generate();
        assert_eq!(code.len(), PREFIX.len() + CODE_LEN);
        assert!(code.starts_with("B-"));
        assert!(code[2..]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn codes_do_not_repeat_in_practice() {
        let codes: HashSet<_> = (0..1000).map(|_| RandomCodeGenerator.generate()).collect();
        assert_eq!(codes.len(), 1000);
    }
}
