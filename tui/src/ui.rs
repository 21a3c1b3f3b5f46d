mod layout;
mod widgets;

pub use layout::render;
pub use widgets::{
    render_delete_confirmation, render_form, render_header, render_help_screen, render_profile,
    render_status_bar, render_story_list,
};
