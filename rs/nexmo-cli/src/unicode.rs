/// Decode `\uXXXXXXXX` escapes in message text.
///
/// Shells make it awkward to pass emoji and other non-BMP characters, so the message
/// text may spell them as a backslash, `u` and eight hex digits. The digits are either
/// a code point (`\u0001F600`) or a UTF-16 surrogate pair (`\uD83DDE00`).
/// Anything that doesn't decode to a character is left as written.
pub fn unescape(text: &str) -> String {
	let mut output = String::with_capacity(text.len());
	let mut rest = text;

	while let Some(start) = rest.find("\\u") {
		output.push_str(&rest[..start]);
		let after = &rest[start + 2..];

		match after.get(..8).and_then(decode) {
			Some(c) => {
				output.push(c);
				rest = &after[8..];
			}
			None => {
				output.push_str("\\u");
				rest = after;
			}
		}
	}

	output.push_str(rest);
	output
}

fn decode(hex: &str) -> Option<char> {
	if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
		return None;
	}

	let value = u32::from_str_radix(hex, 16).ok()?;
	if let Some(c) = char::from_u32(value) {
		return Some(c);
	}

	let (high, low) = (value >> 16, value & 0xffff);
	if (0xd800..0xdc00).contains(&high) && (0xdc00..0xe000).contains(&low) {
		return char::from_u32(0x10000 + ((high - 0xd800) << 10) + (low - 0xdc00));
	}

	None
}
