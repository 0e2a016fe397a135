/// Build a [`Template`](crate::Template) from alternating SQL fragments and
/// `{value}` interpolations.
///
/// Each `{expr}` becomes a bound parameter. A fragment may follow each value;
/// leaving it out is the same as an empty fragment.
///
/// ```
/// use duosql::{PlaceholderStyle, sql};
///
/// let title = "hello";
/// let t = sql!("SELECT * FROM contents WHERE title = " {title});
/// assert_eq!(t.to_sql(PlaceholderStyle::Numbered), "SELECT * FROM contents WHERE title = $1");
/// ```
#[macro_export]
macro_rules! sql {
    ($head:literal $( { $value:expr } $($tail:literal)? )*) => {{
        #[allow(unused_mut)]
        let mut t = $crate::Template::new($head);
        $(
            t.push_bind($value);
            $( t.push($tail); )?
        )*
        t
    }};
}

/// Build a [`Record`](crate::Record) from `column => value` pairs, keeping
/// their order.
///
/// ```
/// use duosql::record;
///
/// let r = record! { "title" => "hello", "views" => 3 };
/// assert_eq!(r.keys().collect::<Vec<_>>(), ["title", "views"]);
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::Record::new()
    };
    ($($column:expr => $value:expr),+ $(,)?) => {{
        let mut r = $crate::Record::new();
        $( r.insert($column, $value); )+
        r
    }};
}
