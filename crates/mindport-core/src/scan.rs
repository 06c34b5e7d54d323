//! Depth-aware tag matching over raw markup text.
//!
//! This is not a markup parser: it only looks for `<tag`, `</tag>` and the `>` that ends an open
//! tag. A `>` or `<` inside a quoted attribute value is not understood and will confuse the
//! scanner; well-formed exports escape both as entities.

/// An open tag found in the text, e.g. `<font NAME="Arial" SIZE="12"/>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenTag<'a> {
    /// Byte offset of the `<`.
    pub start: usize,
    /// Byte offset just past the terminating `>`.
    pub end: usize,
    /// Everything between the tag name and `>` (minus a trailing `/`).
    pub attrs: &'a str,
    pub self_closing: bool,
}

fn is_name_boundary(next: Option<u8>) -> bool {
    match next {
        None => true,
        Some(b) => b.is_ascii_whitespace() || b == b'>' || b == b'/',
    }
}

/// Byte offset of the next `<tag` at or after `from` that is followed by whitespace, `>` or `/`
/// (so `<node` does not match `<nodes`).
pub fn find_open_tag(text: &str, tag: &str, from: usize) -> Option<usize> {
    let needle_len = tag.len() + 1;
    let bytes = text.as_bytes();
    let mut cursor = from;
    loop {
        let rest = text.get(cursor..)?;
        let rel = rest.find('<')?;
        let at = cursor + rel;
        if text
            .get(at + 1..at + needle_len)
            .is_some_and(|name| name == tag)
            && is_name_boundary(bytes.get(at + needle_len).copied())
        {
            return Some(at);
        }
        cursor = at + 1;
    }
}

/// Byte offset of the next `needle` at or after `from`.
fn find_needle(text: &str, needle: &str, from: usize) -> Option<usize> {
    let rest = text.get(from..)?;
    rest.find(needle).map(|rel| from + rel)
}

pub fn close_tag_len(tag: &str) -> usize {
    tag.len() + 3
}

/// Reads the open tag starting at `start` (which must point at `<tag`).
///
/// Returns `None` when the tag is never terminated by `>`.
pub fn read_open_tag<'a>(text: &'a str, tag: &str, start: usize) -> Option<OpenTag<'a>> {
    let name_end = start + 1 + tag.len();
    let gt = name_end + text.get(name_end..)?.find('>')?;
    let inner = &text[name_end..gt];
    let self_closing = inner.ends_with('/');
    let attrs = if self_closing {
        &inner[..inner.len() - 1]
    } else {
        inner
    };
    Some(OpenTag {
        start,
        end: gt + 1,
        attrs,
        self_closing,
    })
}

/// Finds the `</tag>` matching an open tag whose `>` has already been consumed up to `start`.
///
/// Nested non-self-closing `<tag ...>` elements push the depth, self-closing ones do not.
/// Returns the byte offset of the matching close tag, or `None` when the element is unclosed.
///
/// The next open and the next close offsets are each searched for once and kept until the
/// cursor passes them, so one call is linear in the length of the element.
pub fn find_matching_close(text: &str, tag: &str, start: usize) -> Option<usize> {
    let needle = format!("</{tag}>");
    let mut depth = 1usize;
    let mut close = find_needle(text, &needle, start)?;
    let mut open = find_open_tag(text, tag, start);
    loop {
        match open {
            Some(at) if at < close => {
                let open_tag = read_open_tag(text, tag, at)?;
                if !open_tag.self_closing {
                    depth += 1;
                }
                open = find_open_tag(text, tag, open_tag.end);
                // An open tag whose `>` lies past `close` swallowed it.
                if close < open_tag.end {
                    close = find_needle(text, &needle, open_tag.end)?;
                }
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some(close);
                }
                close = find_needle(text, &needle, close + needle.len())?;
            }
        }
    }
}

/// Iterates over every `<tag ...>` open tag in `text`, at any nesting depth.
pub fn open_tags<'a>(text: &'a str, tag: &'a str) -> OpenTags<'a> {
    OpenTags {
        text,
        tag,
        cursor: 0,
    }
}

pub struct OpenTags<'a> {
    text: &'a str,
    tag: &'a str,
    cursor: usize,
}

impl<'a> Iterator for OpenTags<'a> {
    type Item = OpenTag<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = find_open_tag(self.text, self.tag, self.cursor)?;
        match read_open_tag(self.text, self.tag, start) {
            Some(open) => {
                self.cursor = open.end;
                Some(open)
            }
            None => {
                self.cursor = self.text.len();
                None
            }
        }
    }
}
