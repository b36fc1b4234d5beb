mod templates {
    dry_mustache::directory!("templates/");
    dry_mustache::file!("template/button.mustache");
    //language=html
    dry_mustache::str!("hello_first_last", r#"
        <p>Hello {{firstname}} {{lastname}}</p>
    "#);
}


use serde_json::json;

fn main() -> Result<(), dry_mustache::RenderError> {
    tracing_subscriber::fmt::init();

    let page = json!({
        "title": "Todos",
        "head": r#"<link rel="stylesheet" href="todo.css">"#,
        "links": [
            { "href": "/", "text": "Home" },
            { "href": "/about", "text": "About & Contact" },
        ],
        "todos": [
            { "id": 42, "label": "My Todo", "done": false },
            { "id": 43, "label": "Feed <cat>", "done": true },
        ],
    });
    templates::page().render(&page, |html| {
        println!("{}", String::from_utf8_lossy(html));
    })?;

    let button = json!({ "id": 43, "label": "Single File Todo" });
    println!("{}", templates::button().render_to_string(&button)?);

    let names = json!({ "firstname": "King", "lastname": "Tubby" });
    println!("{}", templates::hello_first_last().render_to_string(&names)?);

    Ok(())
}
