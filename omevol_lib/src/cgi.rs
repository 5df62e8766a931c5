//! CGI style request parsing
//!
//! Decodes query strings, form bodies and cookies into string maps.

use std::{
    collections::HashMap,
    io::{self, Read},
};

use nom::{
    bytes::complete::{take_till, take_while_m_n},
    character::complete::char,
    combinator::{map_res, opt},
    multi::separated_list0,
    sequence::{pair, preceded},
    IResult,
};

type Pair<'a> = (&'a str, Option<&'a str>);

fn query_pairs(s: &str) -> IResult<&str, Vec<Pair>> {
    let key = take_till(|c: char| c == '=' || c == '&');
    let value = opt(preceded(char('='), take_till(|c: char| c == '&')));
    separated_list0(char('&'), pair(key, value))(s)
}

/// `%XX` escape
fn escaped_byte(s: &str) -> IResult<&str, u8> {
    map_res(
        preceded(char('%'), take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit())),
        |hex| u8::from_str_radix(hex, 16),
    )(s)
}

/// Decode one url encoded component, `+` is a space
///
/// Malformed escapes are kept as they are.
pub fn decode_component(s: &str) -> String {
    let mut bytes = Vec::with_capacity(s.len());
    let mut rest = s;

    while let Some(c) = rest.chars().next() {
        if let Ok((remaining, byte)) = escaped_byte(rest) {
            bytes.push(byte);
            rest = remaining;
            continue;
        }

        if c == '+' {
            bytes.push(b' ');
        } else {
            let mut buf = [0; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        }
        rest = &rest[c.len_utf8()..];
    }

    String::from_utf8_lossy(&bytes).into_owned()
}

/// Decode `k=v&k2=v2`
///
/// Pairs with an empty key are skipped, a key without `=` maps to an empty string.
/// Later duplicates replace earlier ones.
pub fn url_decode(s: &str) -> HashMap<String, String> {
    let pairs = match query_pairs(s) {
        Ok((_, pairs)) => pairs,
        Err(_) => return HashMap::new(),
    };

    pairs
        .into_iter()
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (decode_component(key), value.map(decode_component).unwrap_or_default()))
        .collect()
}

/// `name=value; name2=value2`
pub fn parse_cookies(s: &str) -> HashMap<String, String> {
    s.split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| match item.split_once('=') {
            Some((key, value)) => (key.trim().to_owned(), value.trim().to_owned()),
            None => (item.to_owned(), String::new()),
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CgiParser {
    pub env: HashMap<String, String>,
    pub get: HashMap<String, String>,
    pub post: HashMap<String, String>,
    pub cookie: HashMap<String, String>,
}

impl CgiParser {
    /// Parse a request
    ///
    /// `args` are the command line arguments without the program name, the first one
    /// is used as query string when `QUERY_STRING` is not set.
    /// For `POST` requests `CONTENT_LENGTH` bytes of `stdin` are decoded as form data.
    pub fn new<R: Read>(
        args: &[String],
        env: HashMap<String, String>,
        stdin: R,
    ) -> io::Result<CgiParser> {
        let query = env
            .get("QUERY_STRING")
            .map(String::as_str)
            .or_else(|| args.first().map(String::as_str))
            .unwrap_or_default();
        let get = url_decode(query);

        let post = if env.get("REQUEST_METHOD").map(String::as_str) == Some("POST") {
            let length = env
                .get("CONTENT_LENGTH")
                .and_then(|len| len.trim().parse::<u64>().ok())
                .unwrap_or(0);
            let mut body = Vec::new();
            stdin.take(length).read_to_end(&mut body)?;
            url_decode(&String::from_utf8_lossy(&body))
        } else {
            HashMap::new()
        };

        let cookie = env
            .get("HTTP_COOKIE")
            .map(|cookies| parse_cookies(cookies))
            .unwrap_or_default();

        Ok(CgiParser {
            env,
            get,
            post,
            cookie,
        })
    }

    /// GET and POST parameters together, POST wins on conflict
    pub fn params(&self) -> HashMap<String, String> {
        let mut params = self.get.clone();
        params.extend(self.post.iter().map(|(k, v)| (k.clone(), v.clone())));
        params
    }
}
