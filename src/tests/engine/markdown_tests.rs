use super::*;

#[test]
fn escapes_markdown_v2_specials() {
    assert_eq!(escape_md("a_b*c.txt"), "a\\_b\\*c\\.txt");
    assert_eq!(escape_md("(1+1)=2!"), "\\(1\\+1\\)\\=2\\!");
    assert_eq!(escape_md("plain words"), "plain words");
}

#[test]
fn escapes_backslash_first_class() {
    assert_eq!(escape_md("a\\b"), "a\\\\b");
}

#[test]
fn code_blocks_escape_only_backticks_and_backslashes() {
    assert_eq!(escape_code("x_`y`"), "x_\\`y\\`");
    assert_eq!(code_block("buy milk."), "```\nbuy milk.\n```");
}
