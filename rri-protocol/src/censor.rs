//! Redaction of sensitive values in raw messages.

use lazy_static::lazy_static;
use regex::Regex;

/// Replacement for censored values.
pub const REDACTED: &str = "******";

lazy_static! {
    static ref PASSWORD_LINE: Regex =
        Regex::new(r"(?im)^([ \t]*password[ \t]*:[ \t]*)[^ \t\r\n][^\r\n]*")
            .expect("password pattern is valid");
}

/// Replaces the value of every `password:` line with [`REDACTED`].
///
/// All other lines are left untouched. Apply this before a raw message is
/// logged or shown.
pub fn censor_raw_message(msg: &str) -> String {
    PASSWORD_LINE
        .replace_all(msg, format!("${{1}}{}", REDACTED).as_str())
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_censor_raw_message() {
        let cases = [
            (
                "version: 5.0\naction: info\ndomain: denic.de",
                "version: 5.0\naction: info\ndomain: denic.de",
            ),
            (
                "version: 5.0\naction: info\nno-password: foobar\ndomain: denic.de",
                "version: 5.0\naction: info\nno-password: foobar\ndomain: denic.de",
            ),
            (
                "version: 5.0\naction: info\npassword:\ndomain: denic.de",
                "version: 5.0\naction: info\npassword:\ndomain: denic.de",
            ),
            (
                "password: secret-password\nversion: 5.0\naction: LOGIN\nuser: DENIC-1000011-RRI",
                "password: ******\nversion: 5.0\naction: LOGIN\nuser: DENIC-1000011-RRI",
            ),
            (
                "version: 5.0\naction: LOGIN\npassword: secret-password\nuser: DENIC-1000011-RRI",
                "version: 5.0\naction: LOGIN\npassword: ******\nuser: DENIC-1000011-RRI",
            ),
            (
                "version: 5.0\naction: LOGIN\nuser: DENIC-1000011-RRI\npassword: secret-password",
                "version: 5.0\naction: LOGIN\nuser: DENIC-1000011-RRI\npassword: ******",
            ),
            (
                "password: secret-password\nversion: 5.0\npassword: secret-password\naction: LOGIN\nuser: DENIC-1000011-RRI\npassword: secret-password",
                "password: ******\nversion: 5.0\npassword: ******\naction: LOGIN\nuser: DENIC-1000011-RRI\npassword: ******",
            ),
            (
                "version: 5.0\naction: LOGIN\npassword:hunter2",
                "version: 5.0\naction: LOGIN\npassword:******",
            ),
            (
                "version: 5.0\naction: LOGIN\n  password: hunter2\nuser: DENIC-1000011-RRI",
                "version: 5.0\naction: LOGIN\n  password: ******\nuser: DENIC-1000011-RRI",
            ),
            (
                "version: 5.0\naction: LOGIN\npassword : hunter2",
                "version: 5.0\naction: LOGIN\npassword : ******",
            ),
        ];

        for (input, expected) in cases {
            assert_eq!(censor_raw_message(input), expected, "input: {input:?}");
        }
    }

    #[test]
    fn test_censor_consecutive_and_crlf() {
        assert_eq!(
            censor_raw_message("password: a\npassword: b"),
            "password: ******\npassword: ******"
        );
        assert_eq!(
            censor_raw_message("user: x\r\nPassword:\tsecret\r\naction: LOGIN"),
            "user: x\r\nPassword:\t******\r\naction: LOGIN"
        );
    }

    #[test]
    fn test_parsed_password_never_survives() {
        for msg in [
            "version: 5.0\naction: LOGIN\nuser: u\npassword:hunter2",
            "version: 5.0\naction: LOGIN\nuser: u\n  password: hunter2",
            "version: 5.0\naction: LOGIN\nuser: u\nPASSWORD:\thunter2",
        ] {
            let query = crate::parse_query(msg).unwrap();
            assert_eq!(query.first_field("password"), "hunter2");
            assert!(!censor_raw_message(msg).contains("hunter2"), "input: {msg:?}");
        }
    }
}
