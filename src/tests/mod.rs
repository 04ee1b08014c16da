mod support;

mod domain {
    mod parser_tests;
}

mod field {
    mod controller_tests;
    mod rebuild_tests;
}

mod form {
    mod form_tests;
}

mod model {
    mod store_tests;
}

mod validation {
    mod registry_tests;
}

mod widget {
    mod widget_tests;
}

#[cfg(feature = "tui")]
mod app {
    mod session_tests;
}

#[cfg(feature = "tui")]
mod presentation {
    mod render_tests;
}
