use super::*;

#[test]
fn converts_br_and_closing_p_to_newlines() {
    assert_eq!(html_to_text("<p>First<br>Second</p>Third"), "First\nSecond\nThird");
}

#[test]
fn drops_inline_formatting_tags() {
    assert_eq!(html_to_text("<strong>bold</strong> text"), "bold text");
}

#[test]
fn unescapes_common_entities() {
    assert_eq!(html_to_text("A&nbsp;&amp;&nbsp;B"), "A & B");
}

#[test]
fn plain_text_passes_through_unchanged() {
    assert_eq!(html_to_text("just text"), "just text");
}
