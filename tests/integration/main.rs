mod api_tests;
mod library_tests;
