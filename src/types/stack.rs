use std::fmt;

use tracing::debug;

use super::error::RuleError;
use super::Keyword;

/// Behaviour every value held by a [`Stack`] must provide.
pub trait Element: Clone + fmt::Debug + fmt::Display {
    /// Name used in diagnostics.
    const KIND: &'static str;

    fn validate(&self) -> Result<(), RuleError>;

    /// The keyword this element is bound to, if any. Used by keyword-unique
    /// stacks and to keep target and bind keywords apart.
    fn bound_keyword(&self) -> Option<Keyword> {
        None
    }

    /// Case-insensitive text match used by [`Stack::contains`].
    fn matches(&self, text: &str) -> bool {
        self.to_string().eq_ignore_ascii_case(text)
    }
}

/// Logical role of a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackKind {
    /// Ordered list with no boolean meaning.
    List,
    And,
    Or,
    /// Negation; holds exactly one element.
    Not,
}

impl StackKind {
    #[must_use]
    pub fn is_boolean(self) -> bool {
        !matches!(self, StackKind::List)
    }
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackKind::List => write!(f, "LIST"),
            StackKind::And => write!(f, "AND"),
            StackKind::Or => write!(f, "OR"),
            StackKind::Not => write!(f, "NOT"),
        }
    }
}

/// Which builder owns a stack. Value lists carry the keyword they render for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    TargetRules,
    BindRules,
    Values(Keyword),
    AttributeFilters,
    PermissionBindRules,
    Instructions,
}

impl Category {
    #[must_use]
    pub fn keyword(self) -> Option<Keyword> {
        match self {
            Category::Values(kw) => Some(kw),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::TargetRules => write!(f, "target rules"),
            Category::BindRules => write!(f, "bind rules"),
            Category::Values(kw) => write!(f, "{kw} values"),
            Category::AttributeFilters => write!(f, "attribute filters"),
            Category::PermissionBindRules => write!(f, "permission bind rules"),
            Category::Instructions => write!(f, "instructions"),
        }
    }
}

/// Separator placed between the elements of a [`StackKind::List`] stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    /// `||`, used by multi-valued DN, OID and attribute expressions.
    DoublePipe,
    /// `&&`, used between attribute filters of one operation.
    DoubleAmpersand,
    Comma,
    Semicolon,
    /// A single space when padded, nothing otherwise.
    Space,
    Newline,
}

impl Delimiter {
    /// The bare token, without padding.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Delimiter::DoublePipe => "||",
            Delimiter::DoubleAmpersand => "&&",
            Delimiter::Comma => ",",
            Delimiter::Semicolon => ";",
            Delimiter::Space => " ",
            Delimiter::Newline => "\n",
        }
    }

    fn render(self, padded: bool) -> &'static str {
        match (self, padded) {
            (Delimiter::DoublePipe, true) => " || ",
            (Delimiter::DoubleAmpersand, true) => " && ",
            (Delimiter::Space, false) => "",
            (other, _) => other.token(),
        }
    }
}

/// How the values of a multi-valued expression are quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuoteStyle {
    /// One pair of quotes around the whole joined value: `"a || b"`.
    #[default]
    Outer,
    /// Each value quoted, delimiters left bare: `"a" || "b"`.
    PerElement,
}

/// Admission rule applied to every element pushed into a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PushPolicy {
    /// Any valid element of the stack's type; duplicates allowed.
    TypeOnly,
    /// At most one element per keyword.
    UniqueKeyword,
    /// No two elements with the same rendered text (case-insensitive).
    UniqueValue,
}

/// An element of a stack: a leaf value or a nested stack of the same type.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<T> {
    Leaf(T),
    Stack(Stack<T>),
}

impl<T: Element> Node<T> {
    pub fn validate(&self) -> Result<(), RuleError> {
        match self {
            Node::Leaf(value) => value.validate(),
            Node::Stack(stack) => stack.validate(),
        }
    }

    #[must_use]
    pub fn keyword(&self) -> Option<Keyword> {
        match self {
            Node::Leaf(value) => value.bound_keyword(),
            Node::Stack(stack) => stack.keyword(),
        }
    }

    #[must_use]
    pub fn as_leaf(&self) -> Option<&T> {
        match self {
            Node::Leaf(value) => Some(value),
            Node::Stack(_) => None,
        }
    }

    #[must_use]
    pub fn as_stack(&self) -> Option<&Stack<T>> {
        match self {
            Node::Leaf(_) => None,
            Node::Stack(stack) => Some(stack),
        }
    }

    #[must_use]
    pub fn into_leaf(self) -> Option<T> {
        match self {
            Node::Leaf(value) => Some(value),
            Node::Stack(_) => None,
        }
    }

    #[must_use]
    pub fn is_stack(&self) -> bool {
        matches!(self, Node::Stack(_))
    }

    fn matches(&self, text: &str) -> bool {
        match self {
            Node::Leaf(value) => value.matches(text),
            Node::Stack(stack) => stack.to_string().eq_ignore_ascii_case(text),
        }
    }
}

impl<T: Element> From<T> for Node<T> {
    fn from(value: T) -> Self {
        Node::Leaf(value)
    }
}

impl<T: Element> From<Stack<T>> for Node<T> {
    fn from(stack: Stack<T>) -> Self {
        Node::Stack(stack)
    }
}

impl<T: Element> fmt::Display for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf(value) => write!(f, "{value}"),
            Node::Stack(stack) => write!(f, "{stack}"),
        }
    }
}

/// Ordered, homogeneous container of values and nested stacks.
///
/// One generic type backs every multi-valued construct of the syntax: target
/// rule collections, boolean bind rules, DN / OID / attribute lists, filter
/// operations and permission bind rule lists. Each is specialised through its
/// [`Category`], [`PushPolicy`], [`Delimiter`] and [`QuoteStyle`].
///
/// Pushes are fail-soft: an element the policy rejects is dropped and the
/// stack is left unchanged. Use [`try_push`](Self::try_push) to see why.
#[derive(Debug, Clone, PartialEq)]
pub struct Stack<T> {
    kind: StackKind,
    category: Category,
    elements: Vec<Node<T>>,
    nesting: bool,
    capacity: Option<usize>,
    minimum: usize,
    delimiter: Delimiter,
    quote: QuoteStyle,
    padding: bool,
    paren: bool,
    policy: PushPolicy,
}

impl<T: Element> Stack<T> {
    /// Create an empty stack. Boolean kinds allow nesting and need at least
    /// one element; `Not` holds at most one.
    #[must_use]
    pub fn new(kind: StackKind, category: Category) -> Self {
        Self {
            kind,
            category,
            elements: Vec::new(),
            nesting: kind.is_boolean(),
            capacity: (kind == StackKind::Not).then_some(1),
            minimum: usize::from(kind.is_boolean()),
            delimiter: Delimiter::DoublePipe,
            quote: QuoteStyle::Outer,
            padding: true,
            paren: false,
            policy: PushPolicy::TypeOnly,
        }
    }

    #[must_use]
    pub fn nesting(mut self, allowed: bool) -> Self {
        self.nesting = allowed;
        self
    }

    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    #[must_use]
    pub fn minimum(mut self, minimum: usize) -> Self {
        self.minimum = minimum;
        self
    }

    #[must_use]
    pub fn delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: PushPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn padding(mut self, padded: bool) -> Self {
        self.padding = padded;
        self
    }

    #[must_use]
    pub fn paren(mut self, parenthesized: bool) -> Self {
        self.paren = parenthesized;
        self
    }

    #[must_use]
    pub fn quote_style(mut self, style: QuoteStyle) -> Self {
        self.quote = style;
        self
    }

    pub fn set_quote_style(&mut self, style: QuoteStyle) -> &mut Self {
        self.quote = style;
        self
    }

    pub fn set_delimiter(&mut self, delimiter: Delimiter) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    pub fn set_paren(&mut self, parenthesized: bool) -> &mut Self {
        self.paren = parenthesized;
        self
    }

    pub fn set_padding(&mut self, padded: bool) -> &mut Self {
        self.padding = padded;
        self
    }

    #[must_use]
    pub fn kind(&self) -> StackKind {
        self.kind
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// The keyword a value list renders for.
    #[must_use]
    pub fn keyword(&self) -> Option<Keyword> {
        self.category.keyword()
    }

    #[must_use]
    pub fn get_quote_style(&self) -> QuoteStyle {
        self.quote
    }

    #[must_use]
    pub fn get_delimiter(&self) -> Delimiter {
        self.delimiter
    }

    #[must_use]
    pub fn get_policy(&self) -> PushPolicy {
        self.policy
    }

    #[must_use]
    pub fn is_parenthesized(&self) -> bool {
        self.paren
    }

    #[must_use]
    pub fn has_padding(&self) -> bool {
        self.padding
    }

    #[must_use]
    pub fn allows_nesting(&self) -> bool {
        self.nesting
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node<T>> {
        self.elements.iter()
    }

    /// Top-level leaf values, skipping nested stacks.
    pub fn leaves(&self) -> impl Iterator<Item = &T> {
        self.elements.iter().filter_map(Node::as_leaf)
    }

    /// Push an element, dropping it if the stack's policy rejects it.
    pub fn push(&mut self, item: impl Into<Node<T>>) -> &mut Self {
        if let Err(err) = self.try_push(item) {
            debug!(category = %self.category, kind = %self.kind, error = %err, "push rejected");
        }
        self
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, item: impl Into<Node<T>>) -> Self {
        self.push(item);
        self
    }

    pub fn push_all<I>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Node<T>>,
    {
        for item in items {
            self.push(item);
        }
        self
    }

    /// Push an element, reporting why it was rejected.
    pub fn try_push(&mut self, item: impl Into<Node<T>>) -> Result<(), RuleError> {
        let node = item.into();
        if let Some(capacity) = self.capacity {
            if self.elements.len() >= capacity {
                return Err(RuleError::CapacityExceeded { capacity });
            }
        }
        self.admit(&node, None)?;
        self.elements.push(node);
        Ok(())
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<Node<T>> {
        self.elements.pop()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Node<T>> {
        self.elements.get(index)
    }

    pub fn remove(&mut self, index: usize) -> Option<Node<T>> {
        (index < self.elements.len()).then(|| self.elements.remove(index))
    }

    /// Replace the element at `index`. Returns `false` when the index is out
    /// of range or the policy rejects the replacement.
    pub fn replace(&mut self, index: usize, item: impl Into<Node<T>>) -> bool {
        match self.try_replace(index, item) {
            Ok(_) => true,
            Err(err) => {
                debug!(category = %self.category, index, error = %err, "replace rejected");
                false
            }
        }
    }

    /// Replace the element at `index`, returning the previous one.
    pub fn try_replace(
        &mut self,
        index: usize,
        item: impl Into<Node<T>>,
    ) -> Result<Node<T>, RuleError> {
        if index >= self.elements.len() {
            return Err(RuleError::OutOfRange { index });
        }
        let node = item.into();
        self.admit(&node, Some(index))?;
        Ok(std::mem::replace(&mut self.elements[index], node))
    }

    /// Case-insensitive search by rendered text. Keyword-unique stacks also
    /// match an element's keyword.
    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        let needle = text.trim();
        if needle.is_empty() {
            return false;
        }
        self.elements.iter().any(|node| {
            node.matches(needle)
                || (self.policy == PushPolicy::UniqueKeyword
                    && node
                        .keyword()
                        .is_some_and(|kw| kw.as_str().eq_ignore_ascii_case(needle)))
        })
    }

    /// Check minimum population and the validity of every element.
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.elements.len() < self.minimum {
            return Err(RuleError::Population {
                kind: format!("{} {}", self.kind, self.category),
                minimum: self.minimum,
                found: self.elements.len(),
            });
        }
        self.elements.iter().try_for_each(Node::validate)
    }

    fn admit(&self, node: &Node<T>, replacing: Option<usize>) -> Result<(), RuleError> {
        if let Node::Stack(stack) = node {
            if !self.nesting {
                return Err(RuleError::NestingDisallowed {
                    context: self.category.to_string(),
                });
            }
            if stack.category != self.category {
                return Err(RuleError::NestingDisallowed {
                    context: format!("{} (found {})", self.category, stack.category),
                });
            }
        }

        node.validate()?;

        if let Some(keyword) = node.keyword() {
            let context = match self.category {
                Category::TargetRules if !keyword.is_target() => Some("target rules"),
                Category::BindRules if !keyword.is_bind() => Some("bind rules"),
                Category::Values(expected) if expected != keyword => Some("a list of another keyword"),
                _ => None,
            };
            if let Some(context) = context {
                return Err(RuleError::WrongContext { keyword, context });
            }
        }

        let others = self
            .elements
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != replacing)
            .map(|(_, other)| other);

        match self.policy {
            PushPolicy::TypeOnly => {}
            PushPolicy::UniqueKeyword => {
                if let Some(keyword) = node.keyword() {
                    let mut others = others;
                    if others.any(|other| other.keyword() == Some(keyword)) {
                        return Err(RuleError::DuplicateKeyword { keyword });
                    }
                }
            }
            PushPolicy::UniqueValue => {
                let value = node.to_string();
                let mut others = others;
                if others.any(|other| other.to_string().eq_ignore_ascii_case(&value)) {
                    return Err(RuleError::DuplicateValue { value });
                }
            }
        }
        Ok(())
    }

    fn render_element(&self, node: &Node<T>) -> String {
        match node {
            Node::Leaf(value) if self.quote == QuoteStyle::PerElement => format!("\"{value}\""),
            other => other.to_string(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Stack<T> {
    type Item = &'a Node<T>;
    type IntoIter = std::slice::Iter<'a, Node<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl<T: Element> fmt::Display for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.elements.is_empty() {
            return Ok(());
        }
        let parts: Vec<String> = self
            .elements
            .iter()
            .map(|node| self.render_element(node))
            .collect();
        let body = match self.kind {
            StackKind::List => parts.join(self.delimiter.render(self.padding)),
            StackKind::And => parts.join(" AND "),
            StackKind::Or => parts.join(" OR "),
            StackKind::Not => parts.join(" "),
        };
        if self.kind == StackKind::Not {
            f.write_str("NOT ")?;
        }
        match (self.paren, self.padding) {
            (true, true) => write!(f, "( {body} )"),
            (true, false) => write!(f, "({body})"),
            (false, _) => f.write_str(&body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BindKeyword, TargetKeyword};

    #[derive(Debug, Clone, PartialEq)]
    struct Word(&'static str);

    impl fmt::Display for Word {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl Element for Word {
        const KIND: &'static str = "word";

        fn validate(&self) -> Result<(), RuleError> {
            if self.0.is_empty() {
                return Err(RuleError::NilOrZero { kind: Self::KIND });
            }
            Ok(())
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Tagged(Keyword, &'static str);

    impl fmt::Display for Tagged {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}={}", self.0, self.1)
        }
    }

    impl Element for Tagged {
        const KIND: &'static str = "tagged";

        fn validate(&self) -> Result<(), RuleError> {
            Ok(())
        }

        fn bound_keyword(&self) -> Option<Keyword> {
            Some(self.0)
        }
    }

    fn words() -> Stack<Word> {
        Stack::new(StackKind::List, Category::AttributeFilters).minimum(1)
    }

    #[test]
    fn list_joins_with_padded_delimiter() {
        let stack = words().with(Word("cn")).with(Word("sn")).with(Word("givenName"));
        assert_eq!(stack.to_string(), "cn || sn || givenName");
        assert_eq!(stack.padding(false).to_string(), "cn||sn||givenName");
    }

    #[test]
    fn per_element_quotes() {
        let stack = words()
            .quote_style(QuoteStyle::PerElement)
            .with(Word("cn"))
            .with(Word("sn"));
        assert_eq!(stack.to_string(), r#""cn" || "sn""#);
    }

    #[test]
    fn parens_follow_padding() {
        let stack = words().paren(true).with(Word("a")).with(Word("b"));
        assert_eq!(stack.to_string(), "( a || b )");
        assert_eq!(stack.padding(false).to_string(), "(a||b)");
    }

    #[test]
    fn zero_elements_are_dropped() {
        let mut stack = words();
        stack.push(Word("")).push(Word("ok"));
        assert_eq!(stack.len(), 1);
        assert!(matches!(
            stack.try_push(Word("")),
            Err(RuleError::NilOrZero { .. })
        ));
    }

    #[test]
    fn type_only_allows_duplicates() {
        let stack = words().with(Word("cn")).with(Word("cn"));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn unique_value_is_case_insensitive() {
        let stack = words()
            .policy(PushPolicy::UniqueValue)
            .with(Word("cn"))
            .with(Word("CN"));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn unique_keyword_rejects_repeats() {
        let target = Keyword::Target(TargetKeyword::Target);
        let mut stack: Stack<Tagged> = Stack::new(StackKind::List, Category::TargetRules)
            .policy(PushPolicy::UniqueKeyword);
        stack.push(Tagged(target, "a"));
        assert_eq!(
            stack.try_push(Tagged(target, "b")),
            Err(RuleError::DuplicateKeyword { keyword: target })
        );
        assert_eq!(stack.len(), 1);
        assert!(stack.contains("TARGET"));
    }

    #[test]
    fn target_rules_reject_bind_keywords() {
        let mut stack: Stack<Tagged> = Stack::new(StackKind::List, Category::TargetRules);
        let err = stack
            .try_push(Tagged(Keyword::Bind(BindKeyword::UserDn), "x"))
            .unwrap_err();
        assert!(matches!(err, RuleError::WrongContext { .. }));
    }

    #[test]
    fn capacity_is_enforced() {
        let mut stack = words().capacity(2);
        stack.push(Word("a")).push(Word("b")).push(Word("c"));
        assert_eq!(stack.len(), 2);
        assert_eq!(
            stack.try_push(Word("d")),
            Err(RuleError::CapacityExceeded { capacity: 2 })
        );
    }

    #[test]
    fn lists_do_not_nest() {
        let inner = words().with(Word("x"));
        let mut outer = words();
        assert!(matches!(
            outer.try_push(inner),
            Err(RuleError::NestingDisallowed { .. })
        ));
    }

    #[test]
    fn boolean_stacks_nest_and_render() {
        let inner = Stack::new(StackKind::Or, Category::AttributeFilters)
            .paren(true)
            .with(Word("a"))
            .with(Word("b"));
        let negated = Stack::new(StackKind::Not, Category::AttributeFilters)
            .paren(true)
            .with(Word("c"));
        let outer = Stack::new(StackKind::And, Category::AttributeFilters)
            .with(inner)
            .with(negated);
        assert_eq!(outer.to_string(), "( a OR b ) AND NOT ( c )");
    }

    #[test]
    fn not_holds_one_element() {
        let mut not: Stack<Word> = Stack::new(StackKind::Not, Category::AttributeFilters);
        not.push(Word("a")).push(Word("b"));
        assert_eq!(not.len(), 1);
        assert_eq!(not.to_string(), "NOT a");
    }

    #[test]
    fn empty_boolean_stack_is_invalid() {
        let and: Stack<Word> = Stack::new(StackKind::And, Category::AttributeFilters);
        assert!(matches!(
            and.validate(),
            Err(RuleError::Population { minimum: 1, found: 0, .. })
        ));
        let mut outer: Stack<Word> = Stack::new(StackKind::Or, Category::AttributeFilters);
        outer.push(and);
        assert!(outer.is_empty());
    }

    #[test]
    fn positional_access() {
        let mut stack = words().with(Word("a")).with(Word("b")).with(Word("c"));
        assert_eq!(stack.get(1).and_then(Node::as_leaf), Some(&Word("b")));
        assert!(stack.get(9).is_none());
        assert!(stack.remove(9).is_none());
        assert!(stack.replace(0, Word("z")));
        assert!(!stack.replace(7, Word("y")));
        assert!(!stack.replace(0, Word("")));
        assert_eq!(stack.pop().and_then(Node::into_leaf), Some(Word("c")));
        assert_eq!(stack.to_string(), "z || b");
        assert_eq!(stack.remove(0).and_then(Node::into_leaf), Some(Word("z")));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn pop_on_empty_is_none() {
        let mut stack = words();
        assert!(stack.pop().is_none());
    }

    #[test]
    fn contains_ignores_case_and_blank_needles() {
        let stack = words().with(Word("givenName"));
        assert!(stack.contains("GIVENNAME"));
        assert!(!stack.contains("  "));
        assert!(!stack.contains("sn"));
    }

    #[test]
    fn unpadded_space_delimiter_concatenates() {
        let stack = words()
            .delimiter(Delimiter::Space)
            .with(Word("(a)"))
            .with(Word("(b)"));
        assert_eq!(stack.to_string(), "(a) (b)");
        assert_eq!(stack.padding(false).to_string(), "(a)(b)");
    }
}
