mod movie_form;
mod movie_list;

pub use movie_form::MovieFormView;
pub use movie_list::MovieListView;
